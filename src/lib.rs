//! Param Evolve - Genetic-algorithm search over discrete parameter spaces.
//!
//! This crate finds parameter combinations that minimize a user-supplied
//! fitness function. Each parameter offers a power-of-two number of
//! candidate values; individuals carry one binary chromosome per parameter
//! and evolve through roulette selection, single-point crossover, and
//! bit-flip mutation.
//!
//! # Architecture
//!
//! The crate is split into three modules:
//!
//! - `schema`: Parameter spaces, configuration, chromosomes, and run records
//! - `evolution`: Codec, genetic operators, fitness evaluation, and the engine
//! - `persist`: Population files and top-fit reports
//!
//! # Example
//!
//! ```rust,no_run
//! use param_evolve::{
//!     evolution::{EvolutionEngine, LogProgress, infallible},
//!     schema::{EvolutionConfig, ParameterSpace, evenly_spaced},
//! };
//!
//! let space = ParameterSpace::new()
//!     .with("a", [1, 2, 4, 8])
//!     .with("b", evenly_spaced(0.5, 4.0, 8).unwrap())
//!     .with_fixed("label", "baseline");
//!
//! let mut config = EvolutionConfig::default();
//! config.population.size = 20;
//! config.population.generations = 10;
//! config.persistence.output_stem = Some("result".into());
//!
//! let mut engine = EvolutionEngine::from_config(config, &space).unwrap();
//! let result = engine
//!     .run_with_progress(
//!         &infallible(|p| p.get_f64("a").unwrap() * p.get_f64("b").unwrap()),
//!         &LogProgress,
//!     )
//!     .unwrap();
//!
//! println!("Best fitness after {} generations: {}",
//!     result.stats.generations, result.stats.best_fitness);
//! ```

pub mod evolution;
pub mod persist;
pub mod schema;

// Re-export commonly used types
pub use evolution::{EvolutionEngine, EvolutionError, FitnessFunction, TopFitArchive};
pub use schema::{EvolutionConfig, EvolutionResult, ParameterAssignment, ParameterSpace};
