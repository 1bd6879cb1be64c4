//! Progress reporting hooks for the generational loop.

use crate::schema::EvolutionProgress;

/// Receives progress ticks. Every method defaults to a no-op, and no sink
/// can influence the search.
pub trait ProgressSink {
    /// An individual of `generation` has been scored.
    fn on_individual(&self, _generation: usize, _completed: usize, _total: usize) {}

    /// A whole generation has been scored.
    fn on_generation(&self, _progress: &EvolutionProgress) {}
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Reports progress through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_individual(&self, generation: usize, completed: usize, total: usize) {
        log::debug!(
            "Generation {}: evaluated {}/{} individuals",
            generation,
            completed,
            total
        );
    }

    fn on_generation(&self, progress: &EvolutionProgress) {
        log::info!(
            "Generation {}/{}: best={:.6}, gen_best={:.6}, avg={:.6}, archived={}",
            progress.generation,
            progress.total_generations,
            progress.best_fitness,
            progress.generation_best,
            progress.avg_fitness,
            progress.archive_size
        );
    }
}

/// Forwards per-generation progress to a closure.
pub struct CallbackProgress<F>(pub F);

impl<F> ProgressSink for CallbackProgress<F>
where
    F: Fn(&EvolutionProgress),
{
    fn on_generation(&self, progress: &EvolutionProgress) {
        (self.0)(progress);
    }
}
