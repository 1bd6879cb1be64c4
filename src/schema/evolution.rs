//! Evolution types: binary chromosomes, individuals, and the progress and
//! result records produced by a run.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ParameterAssignment;

/// Fixed-width bit string encoding an index into a parameter's candidates.
///
/// Serialized as a string of `0`/`1` characters, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chromosome {
    bits: Vec<bool>,
}

impl Chromosome {
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Encode `index` as a zero-padded big-endian bit string of `width` bits.
    pub fn from_index(index: usize, width: usize) -> Self {
        let bits = (0..width)
            .rev()
            .map(|shift| shift < usize::BITS as usize && (index >> shift) & 1 == 1)
            .collect();
        Self { bits }
    }

    /// Interpret the bits as an unsigned big-endian integer.
    pub fn to_index(&self) -> usize {
        self.bits
            .iter()
            .fold(0usize, |acc, &bit| (acc << 1) | bit as usize)
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn flip(&mut self, position: usize) {
        self.bits[position] = !self.bits[position];
    }

    /// `self[..position]` followed by `other[position..]`.
    pub fn splice(&self, other: &Chromosome, position: usize) -> Chromosome {
        let bits = self.bits[..position]
            .iter()
            .chain(&other.bits[position..])
            .copied()
            .collect();
        Chromosome { bits }
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl From<Chromosome> for String {
    fn from(chromosome: Chromosome) -> Self {
        chromosome.to_string()
    }
}

impl TryFrom<String> for Chromosome {
    type Error = InvalidChromosome;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for Chromosome {
    type Err = InvalidChromosome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(InvalidChromosome(s.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Chromosome::from_bits)
    }
}

/// A chromosome string contained something other than `0` and `1`.
#[derive(Debug, thiserror::Error)]
#[error("Invalid chromosome {0:?}: expected only '0' and '1'")]
pub struct InvalidChromosome(pub String);

/// One candidate solution: a chromosome per variable parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Individual {
    genes: BTreeMap<String, Chromosome>,
}

impl Individual {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parameter: impl Into<String>, chromosome: Chromosome) {
        self.genes.insert(parameter.into(), chromosome);
    }

    pub fn get(&self, parameter: &str) -> Option<&Chromosome> {
        self.genes.get(parameter)
    }

    /// Genes in parameter-name order.
    pub fn genes(&self) -> impl Iterator<Item = (&str, &Chromosome)> {
        self.genes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn genes_mut(&mut self) -> impl Iterator<Item = &mut Chromosome> {
        self.genes.values_mut()
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, chromosome)) in self.genes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}:{chromosome}")?;
        }
        Ok(())
    }
}

impl<N: Into<String>> FromIterator<(N, Chromosome)> for Individual {
    fn from_iter<I: IntoIterator<Item = (N, Chromosome)>>(iter: I) -> Self {
        Self {
            genes: iter.into_iter().map(|(n, c)| (n.into(), c)).collect(),
        }
    }
}

/// One generation's worth of individuals.
pub type Population = Vec<Individual>;

// ============================================================================
// Progress and Result Types
// ============================================================================

/// Current phase of the generational loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EvolutionPhase {
    /// Building generation 0.
    #[default]
    Initializing,
    /// Scoring generation 0.
    EvaluatingInitial,
    /// Breeding and scoring later generations.
    Evolving,
    /// All generations done.
    Complete,
}

/// Progress update emitted after each generation is scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Generation just scored (0 for the initial population).
    pub generation: usize,
    /// Total generations planned after the initial one.
    pub total_generations: usize,
    /// Lowest fitness seen across the run.
    pub best_fitness: f64,
    /// Lowest fitness in this generation.
    pub generation_best: f64,
    /// Mean fitness of this generation.
    pub avg_fitness: f64,
    /// Entries currently held by the top-fit archive.
    pub archive_size: usize,
    /// Current phase.
    pub phase: EvolutionPhase,
}

/// Per-generation statistics for plotting.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvolutionHistory {
    /// Lowest fitness per generation.
    pub best_fitness: Vec<f64>,
    /// Mean fitness per generation.
    pub avg_fitness: Vec<f64>,
}

impl EvolutionHistory {
    pub(crate) fn record(&mut self, fitness: &[f64]) {
        let (best, avg) = summarize(fitness);
        self.best_fitness.push(best);
        self.avg_fitness.push(avg);
    }
}

/// Minimum and mean of a fitness slice; `(inf, NaN)` when empty.
pub(crate) fn summarize(fitness: &[f64]) -> (f64, f64) {
    let best = fitness.iter().copied().fold(f64::INFINITY, f64::min);
    let avg = fitness.iter().sum::<f64>() / fitness.len() as f64;
    (best, avg)
}

/// One archived parameter combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub fitness: f64,
    pub params: ParameterAssignment,
}

/// Summary statistics for a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations bred after the initial one.
    pub generations: usize,
    /// Fitness function calls made.
    pub total_evaluations: u64,
    /// Lowest fitness seen across the run.
    pub best_fitness: f64,
    /// Mean fitness of the final population.
    pub final_avg_fitness: f64,
    /// Wall-clock time.
    pub elapsed_seconds: f64,
}

/// Final result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionResult {
    /// Final population.
    pub population: Population,
    /// Fitness of each final individual, in population order.
    pub fitness: Vec<f64>,
    /// Top-fit archive, ascending by fitness.
    pub archive: Vec<ArchiveEntry>,
    pub stats: EvolutionStats,
    pub history: EvolutionHistory,
}

impl EvolutionResult {
    /// Best archived combination, if anything was archived.
    pub fn best(&self) -> Option<&ArchiveEntry> {
        self.archive.first()
    }
}
