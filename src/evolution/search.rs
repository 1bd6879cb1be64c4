//! Generational loop for genetic parameter search.

use std::time::Instant;

use crate::persist::{JsonPopulationStore, PopulationStore, ReportSink, file_outputs};
use crate::schema::{
    EvolutionConfig, EvolutionHistory, EvolutionPhase, EvolutionProgress, EvolutionResult,
    EvolutionStats, ParameterSpace, Population, summarize,
};

use super::archive::TopFitArchive;
use super::codec::ChromosomeCodec;
use super::error::{EvolutionError, InputSizeError};
use super::fitness::{FitnessEvaluator, FitnessFunction};
use super::genome::GenomeRng;
use super::progress::{CallbackProgress, NoProgress, ProgressSink};
use super::selection::RouletteWheel;

/// Evolution engine that runs the search.
///
/// `run` drives every phase; hosts that want to stop early can call
/// [`initialize`](Self::initialize), [`evaluate_initial`](Self::evaluate_initial)
/// and then [`step_generation`](Self::step_generation) as long as they like.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    rng: GenomeRng,
    evaluator: FitnessEvaluator,
    population: Population,
    fitness: Vec<f64>,
    history: EvolutionHistory,
    generation: usize,
    phase: EvolutionPhase,
    seed_population: Option<Population>,
    population_store: Option<Box<dyn PopulationStore>>,
    report_sink: Option<Box<dyn ReportSink>>,
}

impl EvolutionEngine {
    /// Create a new evolution engine.
    ///
    /// Fails before any evaluation if the configuration or the parameter
    /// space is invalid.
    pub fn new(config: EvolutionConfig, space: &ParameterSpace) -> Result<Self, EvolutionError> {
        config.validate()?;
        let (codec, fixed) = ChromosomeCodec::from_space(space)?;

        let rng = match config.random_seed {
            Some(seed) => GenomeRng::new(seed),
            None => GenomeRng::random(),
        };
        let evaluator = FitnessEvaluator::new(codec, fixed, config.archive.top_k);

        Ok(Self {
            config,
            rng,
            evaluator,
            population: Vec::new(),
            fitness: Vec::new(),
            history: EvolutionHistory::default(),
            generation: 0,
            phase: EvolutionPhase::Initializing,
            seed_population: None,
            population_store: None,
            report_sink: None,
        })
    }

    /// Create an engine wired to the files named in `config.persistence`.
    pub fn from_config(config: EvolutionConfig, space: &ParameterSpace) -> Result<Self, EvolutionError> {
        let persistence = config.persistence.clone();
        let mut engine = Self::new(config, space)?;

        if let Some(path) = &persistence.initial_population {
            let seed = JsonPopulationStore::new(path).load()?;
            engine = engine.with_seed_population(seed);
        }
        if let Some(stem) = &persistence.output_stem {
            let (store, report) = file_outputs(stem);
            engine = engine
                .with_population_store(Box::new(store))
                .with_report_sink(Box::new(report));
        }

        Ok(engine)
    }

    /// Seed generation 0 from a saved population instead of random sampling.
    pub fn with_seed_population(mut self, population: Population) -> Self {
        self.seed_population = Some(population);
        self
    }

    /// Save the population at the persistence cadence.
    pub fn with_population_store(mut self, store: Box<dyn PopulationStore>) -> Self {
        self.population_store = Some(store);
        self
    }

    /// Save the top-fit archive at the persistence cadence.
    pub fn with_report_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.report_sink = Some(sink);
        self
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn codec(&self) -> &ChromosomeCodec {
        self.evaluator.codec()
    }

    pub fn archive(&self) -> &TopFitArchive {
        self.evaluator.archive()
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Fitness of the current population, once scored.
    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn phase(&self) -> EvolutionPhase {
        self.phase
    }

    pub fn history(&self) -> &EvolutionHistory {
        &self.history
    }

    /// Build generation 0 from the seed population or at random.
    pub fn initialize(&mut self) -> Result<(), EvolutionError> {
        let size = self.config.population.size;
        if size < 2 {
            return Err(InputSizeError::PopulationTooSmall { size }.into());
        }

        let codec = self.evaluator.codec();
        self.population = match self.seed_population.take() {
            Some(seed) => self.rng.resize_seed_population(codec, seed, size)?,
            None => self.rng.random_population(codec, size),
        };
        self.fitness.clear();
        self.history = EvolutionHistory::default();
        self.generation = 0;
        self.phase = EvolutionPhase::EvaluatingInitial;

        log::info!(
            "Initialized population of {} over {} variable parameters ({} bits)",
            size,
            codec.len(),
            codec.total_bits()
        );
        Ok(())
    }

    /// Score generation 0.
    pub fn evaluate_initial<F>(
        &mut self,
        fitness: &F,
        progress: &dyn ProgressSink,
    ) -> Result<(), EvolutionError>
    where
        F: FitnessFunction + ?Sized,
    {
        if self.phase != EvolutionPhase::EvaluatingInitial {
            return Err(self.out_of_order("evaluate the initial population"));
        }

        self.fitness = self.evaluator.evaluate_population(
            &self.population,
            fitness,
            self.config.evaluation.parallel,
            0,
            progress,
        )?;
        self.history.record(&self.fitness);
        self.phase = EvolutionPhase::Evolving;
        progress.on_generation(&self.progress());
        Ok(())
    }

    /// Breed, score, and adopt the next generation.
    pub fn step_generation<F>(
        &mut self,
        fitness: &F,
        progress: &dyn ProgressSink,
    ) -> Result<(), EvolutionError>
    where
        F: FitnessFunction + ?Sized,
    {
        if self.phase != EvolutionPhase::Evolving {
            return Err(self.out_of_order("breed a generation"));
        }

        let generation = self.generation + 1;
        let children = self.breed()?;
        let scores = self.evaluator.evaluate_population(
            &children,
            fitness,
            self.config.evaluation.parallel,
            generation,
            progress,
        )?;

        self.population = children;
        self.fitness = scores;
        self.generation = generation;
        self.history.record(&self.fitness);

        if generation % self.config.persistence.save_every == 0 {
            self.save_checkpoint()?;
        }

        progress.on_generation(&self.progress());
        Ok(())
    }

    /// Fill a new population by selection, crossover, and mutation.
    fn breed(&mut self) -> Result<Population, EvolutionError> {
        let size = self.config.population.size;
        let crossover_rate = self.config.genetic.crossover_rate;
        let mutation_rate = self.config.genetic.mutation_rate;

        let wheel = RouletteWheel::new(&self.fitness)?;
        let mut next = Vec::with_capacity(size);

        while next.len() < size {
            let parent1 = &self.population[wheel.spin(self.rng.rng_mut())];
            let parent2 = &self.population[wheel.spin(self.rng.rng_mut())];

            let (child1, child2) = self.rng.crossover(parent1, parent2, crossover_rate);
            let mut children = [child1, child2];
            self.rng.mutate(&mut children, mutation_rate);

            for child in children {
                if next.len() < size {
                    next.push(child);
                }
            }
        }

        Ok(next)
    }

    /// Write the archive report and current population, when configured.
    pub fn save_checkpoint(&self) -> Result<(), EvolutionError> {
        if let Some(sink) = &self.report_sink {
            sink.save(self.evaluator.archive())?;
        }
        if let Some(store) = &self.population_store {
            store.save(&self.population)?;
        }
        if self.report_sink.is_some() || self.population_store.is_some() {
            log::info!("Saved checkpoint at generation {}", self.generation);
        }
        Ok(())
    }

    /// Current progress.
    pub fn progress(&self) -> EvolutionProgress {
        let (generation_best, avg_fitness) = summarize(&self.fitness);
        EvolutionProgress {
            generation: self.generation,
            total_generations: self.config.population.generations,
            best_fitness: self.evaluator.archive().best().unwrap_or(generation_best),
            generation_best,
            avg_fitness,
            archive_size: self.evaluator.archive().len(),
            phase: self.phase,
        }
    }

    fn out_of_order(&self, action: &'static str) -> EvolutionError {
        EvolutionError::OutOfOrder {
            action,
            phase: self.phase,
        }
    }

    /// Run the search, reporting to `progress`.
    pub fn run_with_progress<F>(
        &mut self,
        fitness: &F,
        progress: &dyn ProgressSink,
    ) -> Result<EvolutionResult, EvolutionError>
    where
        F: FitnessFunction + ?Sized,
    {
        let start_time = Instant::now();

        self.initialize()?;
        self.evaluate_initial(fitness, progress)?;

        while self.generation < self.config.population.generations {
            self.step_generation(fitness, progress)?;
        }
        self.phase = EvolutionPhase::Complete;

        let elapsed = start_time.elapsed().as_secs_f64();
        let (generation_best, final_avg_fitness) = summarize(&self.fitness);
        let archive = self.evaluator.archive();

        Ok(EvolutionResult {
            population: self.population.clone(),
            fitness: self.fitness.clone(),
            archive: archive.entries(),
            stats: EvolutionStats {
                generations: self.generation,
                total_evaluations: self.evaluator.evaluations(),
                best_fitness: archive.best().unwrap_or(generation_best),
                final_avg_fitness,
                elapsed_seconds: elapsed,
            },
            history: self.history.clone(),
        })
    }

    /// Run evolution with a per-generation progress callback.
    pub fn run_with_callback<F, C>(&mut self, fitness: &F, callback: C) -> Result<EvolutionResult, EvolutionError>
    where
        F: FitnessFunction + ?Sized,
        C: Fn(&EvolutionProgress),
    {
        self.run_with_progress(fitness, &CallbackProgress(callback))
    }

    /// Run evolution (blocking).
    pub fn run<F>(&mut self, fitness: &F) -> Result<EvolutionResult, EvolutionError>
    where
        F: FitnessFunction + ?Sized,
    {
        self.run_with_progress(fitness, &NoProgress)
    }
}
