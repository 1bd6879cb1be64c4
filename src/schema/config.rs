//! Configuration types for a genetic parameter search run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration for an evolutionary parameter search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Population and generation settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Crossover and mutation probabilities.
    #[serde(default)]
    pub genetic: GeneticAlgorithmConfig,
    /// Top-fit archive settings.
    #[serde(default)]
    pub archive: ArchiveConfig,
    /// Where and how often intermediate state is written.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Fitness evaluation settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl EvolutionConfig {
    /// Validate probabilities and intervals.
    ///
    /// Population size is checked when the engine initializes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check_rate = |value: f64, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::InvalidRate { name, value })
            }
        };

        check_rate(self.genetic.crossover_rate, "crossover_rate")?;
        check_rate(self.genetic.mutation_rate, "mutation_rate")?;

        if self.persistence.save_every == 0 {
            return Err(ConfigError::InvalidSaveInterval);
        }

        Ok(())
    }
}

/// Population and generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of individuals in every generation.
    #[serde(default = "default_population_size")]
    pub size: usize,
    /// Number of generations bred after the initial one.
    #[serde(default = "default_generations")]
    pub generations: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
            generations: default_generations(),
        }
    }
}

fn default_population_size() -> usize {
    50
}
fn default_generations() -> usize {
    50
}

/// Genetic operator probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticAlgorithmConfig {
    /// Probability of crossover per parameter per mating (0.0-1.0).
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    /// Probability of flipping each encoded bit (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
}

impl Default for GeneticAlgorithmConfig {
    fn default() -> Self {
        Self {
            crossover_rate: default_crossover_rate(),
            mutation_rate: default_mutation_rate(),
        }
    }
}

fn default_crossover_rate() -> f64 {
    0.5
}
fn default_mutation_rate() -> f64 {
    0.05
}

/// Top-fit archive configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Number of best parameter combinations kept across the run.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    10
}

/// Persistence cadence and file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Persist archive and population every N generations.
    #[serde(default = "default_save_every")]
    pub save_every: usize,
    /// Output stem; `<stem>.pop` and `<stem>.fit` are written when set.
    #[serde(default)]
    pub output_stem: Option<PathBuf>,
    /// Population file used to seed generation 0.
    #[serde(default)]
    pub initial_population: Option<PathBuf>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_every: default_save_every(),
            output_stem: None,
            initial_population: None,
        }
    }
}

fn default_save_every() -> usize {
    1
}

/// Fitness evaluation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Evaluate a generation on the rayon pool (native targets only).
    #[serde(default)]
    pub parallel: bool,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "Parameter {parameter} has {count} candidate values; use 2^n values or a single fixed value"
    )]
    NotPowerOfTwo { parameter: String, count: usize },
    #[error("Parameter {parameter} has no candidate values")]
    EmptyParameter { parameter: String },
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("Save interval must be at least one generation")]
    InvalidSaveInterval,
    #[error("Cannot space {count} values over [{start}, {end}]")]
    InvalidRange { start: f64, end: f64, count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population.size, 50);
        assert_eq!(config.archive.top_k, 10);
        assert_eq!(config.persistence.save_every, 1);
    }

    #[test]
    fn test_invalid_rates() {
        let mut config = EvolutionConfig::default();
        config.genetic.mutation_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRate {
                name: "mutation_rate",
                ..
            })
        ));

        let mut config = EvolutionConfig::default();
        config.genetic.crossover_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_save_interval() {
        let mut config = EvolutionConfig::default();
        config.persistence.save_every = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSaveInterval)
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EvolutionConfig =
            serde_json::from_str(r#"{"population": {"size": 6}, "random_seed": 7}"#).unwrap();
        assert_eq!(config.population.size, 6);
        assert_eq!(config.population.generations, 50);
        assert_eq!(config.genetic.crossover_rate, 0.5);
        assert_eq!(config.random_seed, Some(7));
    }
}
