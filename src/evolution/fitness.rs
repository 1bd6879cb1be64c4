//! Fitness evaluation for evolutionary parameter search.
//!
//! Individuals are decoded into full parameter combinations, scored by a
//! caller-supplied [`FitnessFunction`], and offered to the run's
//! [`TopFitArchive`].

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::schema::{Individual, ParameterAssignment};

use super::archive::TopFitArchive;
use super::codec::ChromosomeCodec;
use super::error::EvolutionError;
use super::progress::ProgressSink;

/// Boxed error returned by fallible fitness functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Objective to minimize. Lower scores are better.
///
/// Implemented for any `Fn(&ParameterAssignment) -> Result<f64, BoxError>`;
/// wrap infallible closures with [`infallible`].
pub trait FitnessFunction: Sync {
    fn evaluate(&self, params: &ParameterAssignment) -> Result<f64, BoxError>;
}

impl<F> FitnessFunction for F
where
    F: Fn(&ParameterAssignment) -> Result<f64, BoxError> + Sync,
{
    fn evaluate(&self, params: &ParameterAssignment) -> Result<f64, BoxError> {
        self(params)
    }
}

/// Adapter for fitness closures that cannot fail.
#[derive(Debug, Clone, Copy)]
pub struct Infallible<F>(pub F);

impl<F> FitnessFunction for Infallible<F>
where
    F: Fn(&ParameterAssignment) -> f64 + Sync,
{
    fn evaluate(&self, params: &ParameterAssignment) -> Result<f64, BoxError> {
        Ok((self.0)(params))
    }
}

/// Wrap a closure returning a bare score.
pub fn infallible<F>(f: F) -> Infallible<F>
where
    F: Fn(&ParameterAssignment) -> f64 + Sync,
{
    Infallible(f)
}

/// The fitness function failed on a specific parameter combination.
#[derive(Debug, thiserror::Error)]
#[error("Fitness function failed on parameter combination [{assignment}]: {cause}")]
pub struct FitnessEvaluationError {
    /// The combination that was being scored.
    pub assignment: ParameterAssignment,
    /// What went wrong.
    pub cause: FitnessFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum FitnessFailure {
    #[error("{0}")]
    Failed(BoxError),
    #[error("returned non-finite score {0}")]
    NonFinite(f64),
}

/// Scores individuals and keeps the run's top-fit archive current.
pub struct FitnessEvaluator {
    codec: ChromosomeCodec,
    fixed: ParameterAssignment,
    archive: TopFitArchive,
    evaluations: u64,
}

impl FitnessEvaluator {
    /// Create a new fitness evaluator.
    pub fn new(codec: ChromosomeCodec, fixed: ParameterAssignment, top_k: usize) -> Self {
        Self {
            codec,
            fixed,
            archive: TopFitArchive::new(top_k),
            evaluations: 0,
        }
    }

    pub fn codec(&self) -> &ChromosomeCodec {
        &self.codec
    }

    pub fn fixed(&self) -> &ParameterAssignment {
        &self.fixed
    }

    pub fn archive(&self) -> &TopFitArchive {
        &self.archive
    }

    /// Fitness function calls that returned a valid score.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Decode an individual into its full parameter combination.
    pub fn assignment(&self, individual: &Individual) -> Result<ParameterAssignment, EvolutionError> {
        Ok(self.codec.decode_individual(individual, &self.fixed)?)
    }

    /// Score one individual and offer it to the archive.
    pub fn evaluate<F>(&mut self, individual: &Individual, fitness: &F) -> Result<f64, EvolutionError>
    where
        F: FitnessFunction + ?Sized,
    {
        let assignment = self.assignment(individual)?;
        let outcome = fitness.evaluate(&assignment);
        self.record(assignment, outcome)
    }

    /// Score a whole generation, in population order.
    ///
    /// With `parallel` set, fitness calls run on the rayon pool and archive
    /// updates are applied afterwards in population order. Either way the
    /// first failure aborts and later individuals are never recorded.
    pub fn evaluate_population<F>(
        &mut self,
        population: &[Individual],
        fitness: &F,
        parallel: bool,
        generation: usize,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<f64>, EvolutionError>
    where
        F: FitnessFunction + ?Sized,
    {
        let total = population.len();
        let mut scores = Vec::with_capacity(total);

        if parallel {
            let assignments = population
                .iter()
                .map(|individual| self.assignment(individual))
                .collect::<Result<Vec<_>, _>>()?;
            let outcomes = score_all(&assignments, fitness);

            for (index, (assignment, outcome)) in assignments.into_iter().zip(outcomes).enumerate() {
                scores.push(self.record(assignment, outcome)?);
                progress.on_individual(generation, index + 1, total);
            }
        } else {
            for (index, individual) in population.iter().enumerate() {
                scores.push(self.evaluate(individual, fitness)?);
                progress.on_individual(generation, index + 1, total);
            }
        }

        Ok(scores)
    }

    /// Validate a fitness outcome and offer it to the archive.
    fn record(
        &mut self,
        assignment: ParameterAssignment,
        outcome: Result<f64, BoxError>,
    ) -> Result<f64, EvolutionError> {
        let score = match outcome {
            Ok(score) if score.is_finite() => score,
            Ok(score) => {
                return Err(FitnessEvaluationError {
                    assignment,
                    cause: FitnessFailure::NonFinite(score),
                }
                .into());
            }
            Err(err) => {
                return Err(FitnessEvaluationError {
                    assignment,
                    cause: FitnessFailure::Failed(err),
                }
                .into());
            }
        };

        self.evaluations += 1;
        if self.archive.offer(score, &assignment) {
            log::trace!("Archived fitness {:.6} for [{}]", score, assignment);
        }
        Ok(score)
    }
}

/// Call the fitness function on every assignment, preserving order.
#[cfg(not(target_arch = "wasm32"))]
fn score_all<F>(assignments: &[ParameterAssignment], fitness: &F) -> Vec<Result<f64, BoxError>>
where
    F: FitnessFunction + ?Sized,
{
    assignments.par_iter().map(|a| fitness.evaluate(a)).collect()
}

#[cfg(target_arch = "wasm32")]
fn score_all<F>(assignments: &[ParameterAssignment], fitness: &F) -> Vec<Result<f64, BoxError>>
where
    F: FitnessFunction + ?Sized,
{
    // Sequential evaluation for WASM
    assignments.iter().map(|a| fitness.evaluate(a)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::progress::NoProgress;
    use crate::schema::{Chromosome, ParameterSpace};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_evaluator(top_k: usize) -> FitnessEvaluator {
        let space = ParameterSpace::new()
            .with("a", [1, 2, 4, 8])
            .with("b", [10, 20])
            .with_fixed("c", 100);
        let (codec, fixed) = ChromosomeCodec::from_space(&space).unwrap();
        FitnessEvaluator::new(codec, fixed, top_k)
    }

    fn individual(a: usize, b: usize) -> Individual {
        [
            ("a", Chromosome::from_index(a, 2)),
            ("b", Chromosome::from_index(b, 1)),
        ]
        .into_iter()
        .collect()
    }

    fn sum_fitness() -> impl FitnessFunction {
        infallible(|p: &ParameterAssignment| {
            p.get_f64("a").unwrap() + p.get_f64("b").unwrap() + p.get_f64("c").unwrap()
        })
    }

    #[test]
    fn test_fitness_evaluator() {
        let mut evaluator = test_evaluator(5);
        let fitness = evaluator.evaluate(&individual(3, 1), &sum_fitness()).unwrap();
        assert_eq!(fitness, 128.0);
        assert_eq!(evaluator.archive().len(), 1);
        assert_eq!(evaluator.evaluations(), 1);
    }

    #[test]
    fn test_failure_carries_assignment() {
        let mut evaluator = test_evaluator(5);
        let failing = |p: &ParameterAssignment| -> Result<f64, BoxError> {
            if p.get_f64("a") == Some(8.0) {
                Err("diverged".into())
            } else {
                Ok(1.0)
            }
        };

        evaluator.evaluate(&individual(0, 0), &failing).unwrap();
        let err = evaluator.evaluate(&individual(3, 0), &failing).unwrap_err();
        match err {
            EvolutionError::FitnessEvaluation(e) => {
                assert_eq!(e.assignment.get_f64("a"), Some(8.0));
                assert_eq!(e.assignment.get_f64("c"), Some(100.0));
                assert!(e.to_string().contains("diverged"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Archive still holds the earlier success only.
        assert_eq!(evaluator.archive().len(), 1);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut evaluator = test_evaluator(5);
        let err = evaluator
            .evaluate(&individual(0, 0), &infallible(|_: &ParameterAssignment| f64::NAN))
            .unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::FitnessEvaluation(FitnessEvaluationError {
                cause: FitnessFailure::NonFinite(_),
                ..
            })
        ));
        assert!(evaluator.archive().is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let population: Vec<Individual> = (0..4)
            .flat_map(|a| (0..2).map(move |b| individual(a, b)))
            .collect();

        let mut sequential = test_evaluator(3);
        let mut parallel = test_evaluator(3);
        let seq = sequential
            .evaluate_population(&population, &sum_fitness(), false, 0, &NoProgress)
            .unwrap();
        let par = parallel
            .evaluate_population(&population, &sum_fitness(), true, 0, &NoProgress)
            .unwrap();

        assert_eq!(seq, par);
        assert_eq!(sequential.archive().entries(), parallel.archive().entries());
    }

    #[test]
    fn test_sequential_stops_at_first_failure() {
        let calls = AtomicUsize::new(0);
        let failing = |p: &ParameterAssignment| -> Result<f64, BoxError> {
            calls.fetch_add(1, Ordering::Relaxed);
            if p.get_f64("a") == Some(2.0) {
                Err("boom".into())
            } else {
                Ok(1.0)
            }
        };
        let population = vec![individual(0, 0), individual(1, 0), individual(2, 0)];

        let mut evaluator = test_evaluator(5);
        let result = evaluator.evaluate_population(&population, &failing, false, 0, &NoProgress);
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 2);
        assert_eq!(evaluator.archive().len(), 1);
    }
}
