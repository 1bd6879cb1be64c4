//! Genetic search over discrete parameter spaces.
//!
//! # Overview
//!
//! The search pipeline consists of:
//!
//! - **Codec** (`codec`): Binary chromosomes indexing into candidate lists
//! - **Genome Operations** (`genome`): Random generation, crossover, and mutation
//! - **Selection** (`selection`): Fitness-proportionate roulette over `1 / fitness`
//! - **Fitness** (`fitness`): Scoring individuals with a caller-supplied objective
//! - **Archive** (`archive`): The best distinct parameter combinations seen so far
//! - **Search** (`search`): The generational loop tying it together
//!
//! Fitness is minimized and must be strictly positive for selection to work.
//!
//! # Example
//!
//! ```rust,no_run
//! use param_evolve::evolution::{EvolutionEngine, infallible};
//! use param_evolve::schema::{EvolutionConfig, ParameterSpace};
//!
//! let space = ParameterSpace::new()
//!     .with("a", [1, 2, 4, 8])
//!     .with("b", [10, 20]);
//!
//! let mut engine = EvolutionEngine::new(EvolutionConfig::default(), &space).unwrap();
//! let result = engine
//!     .run_with_callback(
//!         &infallible(|p| p.get_f64("a").unwrap() + p.get_f64("b").unwrap()),
//!         |progress| {
//!             println!("Generation {}: best fitness = {:.3}",
//!                 progress.generation, progress.best_fitness);
//!         },
//!     )
//!     .unwrap();
//!
//! if let Some(best) = result.best() {
//!     println!("Best combination: {} (fitness {:.3})", best.params, best.fitness);
//! }
//! ```

mod archive;
mod codec;
mod error;
mod fitness;
mod genome;
mod progress;
mod search;
mod selection;

pub use archive::TopFitArchive;
pub use codec::{ChromosomeCodec, CodecError, GeneSpec, ShapeMismatch, chromosome_width, encode_index};
pub use error::{EvolutionError, InputSizeError};
pub use fitness::{
    BoxError, FitnessEvaluationError, FitnessEvaluator, FitnessFailure, FitnessFunction,
    Infallible, infallible,
};
pub use genome::GenomeRng;
pub use progress::{CallbackProgress, LogProgress, NoProgress, ProgressSink};
pub use search::EvolutionEngine;
pub use selection::{RouletteWheel, SelectionError, select};
