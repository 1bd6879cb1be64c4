//! Genome manipulation utilities for evolutionary search.
//!
//! Provides population initialization, single-point crossover, and bit-flip
//! mutation over binary-encoded individuals.

use rand::prelude::*;

use crate::schema::{Individual, Population};

use super::codec::{ChromosomeCodec, encode_index};
use super::error::InputSizeError;

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Access the underlying generator for selection draws.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Random population of `size` individuals.
    ///
    /// Parameters are filled one at a time, in name order, across the whole
    /// population.
    pub fn random_population(&mut self, codec: &ChromosomeCodec, size: usize) -> Population {
        let mut population = vec![Individual::new(); size];
        for (parameter, gene) in codec.genes() {
            for individual in population.iter_mut() {
                individual.insert(parameter, encode_index(&mut self.rng, gene.max_index()));
            }
        }
        population
    }

    /// Fit a previously saved population to `size` individuals.
    ///
    /// A short population is padded with duplicates drawn uniformly with
    /// replacement; otherwise it is shuffled and truncated.
    pub fn resize_seed_population(
        &mut self,
        codec: &ChromosomeCodec,
        mut seed: Population,
        size: usize,
    ) -> Result<Population, InputSizeError> {
        if seed.is_empty() {
            return Err(InputSizeError::EmptySeedPopulation);
        }
        for (index, individual) in seed.iter().enumerate() {
            codec
                .check_shape(individual)
                .map_err(|mismatch| InputSizeError::SeedShapeMismatch { index, mismatch })?;
        }

        if size > seed.len() {
            let original = seed.len();
            for _ in original..size {
                let pick = self.rng.gen_range(0..original);
                seed.push(seed[pick].clone());
            }
            log::warn!(
                "Seed population padded from {} to {} individuals with duplicates",
                original,
                size
            );
        } else {
            seed.shuffle(&mut self.rng);
            if seed.len() > size {
                log::warn!(
                    "Seed population trimmed from {} to {} individuals",
                    seed.len(),
                    size
                );
            }
            seed.truncate(size);
        }

        Ok(seed)
    }

    /// Single-point crossover, decided independently per parameter.
    ///
    /// One-bit chromosomes are swapped outright; longer ones are cut at a
    /// uniform position in `[1, width - 1]`. Children never share storage
    /// with their parents.
    pub fn crossover(
        &mut self,
        parent1: &Individual,
        parent2: &Individual,
        rate: f64,
    ) -> (Individual, Individual) {
        debug_assert!(parent1.genes().map(|(n, _)| n).eq(parent2.genes().map(|(n, _)| n)));

        let mut child1 = Individual::new();
        let mut child2 = Individual::new();

        for ((parameter, c1), (_, c2)) in parent1.genes().zip(parent2.genes()) {
            if self.rng.r#gen::<f64>() >= rate {
                child1.insert(parameter, c1.clone());
                child2.insert(parameter, c2.clone());
            } else if c1.len() <= 1 {
                child1.insert(parameter, c2.clone());
                child2.insert(parameter, c1.clone());
            } else {
                let position = self.rng.gen_range(1..c1.len());
                child1.insert(parameter, c1.splice(c2, position));
                child2.insert(parameter, c2.splice(c1, position));
            }
        }

        (child1, child2)
    }

    /// Flip every bit of every individual independently with probability `rate`.
    pub fn mutate(&mut self, individuals: &mut [Individual], rate: f64) {
        for individual in individuals.iter_mut() {
            for chromosome in individual.genes_mut() {
                for position in 0..chromosome.len() {
                    if self.rng.r#gen::<f64>() < rate {
                        chromosome.flip(position);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Chromosome, ParameterSpace};

    fn test_codec() -> ChromosomeCodec {
        let space = ParameterSpace::new()
            .with("a", 0..16)
            .with("b", [10, 20])
            .with_fixed("c", 1);
        ChromosomeCodec::from_space(&space).unwrap().0
    }

    fn individual(a: &str, b: &str) -> Individual {
        [
            ("a", a.parse::<Chromosome>().unwrap()),
            ("b", b.parse().unwrap()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_random_population() {
        let mut rng = GenomeRng::new(42);
        let codec = test_codec();

        let population = rng.random_population(&codec, 12);
        assert_eq!(population.len(), 12);
        for individual in &population {
            assert_eq!(individual.len(), 2);
            assert_eq!(individual.get("a").unwrap().len(), 4);
            assert_eq!(individual.get("b").unwrap().len(), 1);
            assert!(codec.check_shape(individual).is_ok());
        }
    }

    #[test]
    fn test_resize_seed_pads_with_seed_members() {
        let mut rng = GenomeRng::new(42);
        let codec = test_codec();
        let seed = vec![individual("0000", "0"), individual("1111", "1")];

        let resized = rng.resize_seed_population(&codec, seed.clone(), 7).unwrap();
        assert_eq!(resized.len(), 7);
        assert_eq!(&resized[..2], &seed[..]);
        assert!(resized.iter().all(|i| seed.contains(i)));
    }

    #[test]
    fn test_resize_seed_truncates() {
        let mut rng = GenomeRng::new(42);
        let codec = test_codec();
        let seed: Population = (0..10)
            .map(|i| {
                let mut ind = individual("0000", "0");
                ind.insert("a", Chromosome::from_index(i, 4));
                ind
            })
            .collect();

        let resized = rng.resize_seed_population(&codec, seed.clone(), 4).unwrap();
        assert_eq!(resized.len(), 4);
        assert!(resized.iter().all(|i| seed.contains(i)));
    }

    #[test]
    fn test_resize_seed_rejects_bad_input() {
        let mut rng = GenomeRng::new(42);
        let codec = test_codec();

        assert!(matches!(
            rng.resize_seed_population(&codec, Vec::new(), 4),
            Err(InputSizeError::EmptySeedPopulation)
        ));

        let wrong = vec![individual("00", "0")];
        assert!(matches!(
            rng.resize_seed_population(&codec, wrong, 4),
            Err(InputSizeError::SeedShapeMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_crossover_zero_rate_copies_parents() {
        let mut rng = GenomeRng::new(42);
        let p1 = individual("0000", "0");
        let p2 = individual("1111", "1");

        for _ in 0..50 {
            let (c1, c2) = rng.crossover(&p1, &p2, 0.0);
            assert_eq!(c1, p1);
            assert_eq!(c2, p2);
        }
    }

    #[test]
    fn test_crossover_full_rate() {
        let mut rng = GenomeRng::new(42);
        let p1 = individual("0000", "0");
        let p2 = individual("1111", "1");
        let mut positions = std::collections::HashSet::new();

        for _ in 0..200 {
            let (c1, c2) = rng.crossover(&p1, &p2, 1.0);

            // One-bit genes swap outright.
            assert_eq!(c1.get("b"), p2.get("b"));
            assert_eq!(c2.get("b"), p1.get("b"));

            let a1 = c1.get("a").unwrap().to_string();
            let a2 = c2.get("a").unwrap().to_string();
            assert_ne!(a1, "0000");
            assert_ne!(a2, "1111");

            let cut = a1.find('1').unwrap();
            assert!((1..4).contains(&cut));
            assert_eq!(a1, format!("{}{}", "0".repeat(cut), "1".repeat(4 - cut)));
            assert_eq!(a2, format!("{}{}", "1".repeat(cut), "0".repeat(4 - cut)));
            positions.insert(cut);
        }

        assert_eq!(positions.len(), 3);
    }

    #[test]
    fn test_crossover_leaves_parents_untouched() {
        let mut rng = GenomeRng::new(7);
        let p1 = individual("0101", "0");
        let p2 = individual("1010", "1");
        let (mut c1, mut c2) = rng.crossover(&p1, &p2, 1.0);

        rng.mutate(std::slice::from_mut(&mut c1), 1.0);
        rng.mutate(std::slice::from_mut(&mut c2), 1.0);

        assert_eq!(p1, individual("0101", "0"));
        assert_eq!(p2, individual("1010", "1"));
    }

    #[test]
    fn test_mutation_rates() {
        let mut rng = GenomeRng::new(42);
        let original = vec![individual("0110", "1"), individual("0000", "0")];

        let mut unchanged = original.clone();
        rng.mutate(&mut unchanged, 0.0);
        assert_eq!(unchanged, original);

        let mut flipped = original.clone();
        rng.mutate(&mut flipped, 1.0);
        assert_eq!(flipped[0], individual("1001", "0"));
        assert_eq!(flipped[1], individual("1111", "1"));
    }
}
