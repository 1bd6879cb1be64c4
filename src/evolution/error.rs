//! Error types surfaced by the evolution engine.

use crate::persist::PersistError;
use crate::schema::{ConfigError, EvolutionPhase};

use super::codec::{CodecError, ShapeMismatch};
use super::fitness::FitnessEvaluationError;
use super::selection::SelectionError;

/// Population sizing and seed-population problems found at initialization.
#[derive(Debug, thiserror::Error)]
pub enum InputSizeError {
    #[error("Population size must be at least 2, got {size}")]
    PopulationTooSmall { size: usize },
    #[error("Seed population is empty")]
    EmptySeedPopulation,
    #[error("Seed individual {index} does not match the parameter space: {mismatch}")]
    SeedShapeMismatch {
        index: usize,
        #[source]
        mismatch: ShapeMismatch,
    },
}

/// Any failure that aborts a run.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    InputSize(#[from] InputSizeError),
    #[error(transparent)]
    FitnessEvaluation(#[from] FitnessEvaluationError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("Cannot {action} while {phase:?}")]
    OutOfOrder {
        action: &'static str,
        phase: EvolutionPhase,
    },
}
