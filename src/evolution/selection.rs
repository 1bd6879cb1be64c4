//! Roulette-wheel parent selection for a minimizing search.
//!
//! Each individual's slice of the wheel is proportional to `1 / fitness`, so
//! lower fitness is more likely to be drawn. Fitness must be strictly
//! positive and finite.

use rand::Rng;

use crate::schema::Individual;

/// Cumulative selection table for one generation.
#[derive(Debug, Clone)]
pub struct RouletteWheel {
    cumulative: Vec<f64>,
}

impl RouletteWheel {
    /// Build the wheel from a generation's fitness values.
    pub fn new(fitness: &[f64]) -> Result<Self, SelectionError> {
        if fitness.is_empty() {
            return Err(SelectionError::EmptyPopulation);
        }
        if let Some((index, &value)) = fitness
            .iter()
            .enumerate()
            .find(|(_, f)| !(f.is_finite() && **f > 0.0))
        {
            return Err(SelectionError::NonPositiveFitness {
                index,
                fitness: value,
            });
        }

        let reciprocal: Vec<f64> = fitness.iter().map(|f| 1.0 / f).collect();
        let total: f64 = reciprocal.iter().sum();
        if !total.is_finite() {
            return Err(SelectionError::DegenerateWeights);
        }

        let mut running = 0.0;
        let cumulative = reciprocal
            .iter()
            .map(|w| {
                running += w / total;
                running
            })
            .collect();

        Ok(Self { cumulative })
    }

    /// Draw one index. Falls back to the last slot when rounding leaves the
    /// final cumulative weight at or below the draw.
    pub fn spin<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let draw: f64 = rng.r#gen();
        self.cumulative
            .iter()
            .position(|&c| draw < c)
            .unwrap_or(self.cumulative.len() - 1)
    }

    /// Selection probability of each slot.
    pub fn probabilities(&self) -> Vec<f64> {
        let mut previous = 0.0;
        self.cumulative
            .iter()
            .map(|&c| {
                let p = c - previous;
                previous = c;
                p
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }
}

/// Sample `count` individuals with replacement, weighted by `1 / fitness`.
pub fn select<'a, R: Rng + ?Sized>(
    population: &'a [Individual],
    fitness: &[f64],
    count: usize,
    rng: &mut R,
) -> Result<Vec<&'a Individual>, SelectionError> {
    if population.len() != fitness.len() {
        return Err(SelectionError::LengthMismatch {
            population: population.len(),
            fitness: fitness.len(),
        });
    }
    let wheel = RouletteWheel::new(fitness)?;
    Ok((0..count).map(|_| &population[wheel.spin(rng)]).collect())
}

/// Selection input errors.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Cannot select from an empty population")]
    EmptyPopulation,
    #[error("Population has {population} individuals but {fitness} fitness values")]
    LengthMismatch { population: usize, fitness: usize },
    #[error(
        "Fitness {fitness} of individual {index} is not strictly positive; roulette selection weights by 1/fitness"
    )]
    NonPositiveFitness { index: usize, fitness: f64 },
    #[error("Fitness values too close to zero to form selection weights")]
    DegenerateWeights,
}
