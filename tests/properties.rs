use proptest::prelude::*;

use param_evolve::{
    ParameterAssignment, ParameterSpace, TopFitArchive,
    evolution::{ChromosomeCodec, GenomeRng, RouletteWheel},
};

fn space_from_exponents(exponents: &[u32]) -> ParameterSpace {
    exponents
        .iter()
        .enumerate()
        .fold(ParameterSpace::new(), |space, (i, &e)| {
            space.with(format!("p{i}"), (0..1i64 << e).map(|v| v * 10))
        })
}

proptest! {
    #[test]
    fn test_random_population_decodes_into_candidates(
        exponents in prop::collection::vec(1u32..6, 1..5),
        size in 2usize..30,
        seed in any::<u64>(),
    ) {
        let space = space_from_exponents(&exponents);
        let (codec, fixed) = ChromosomeCodec::from_space(&space).unwrap();
        let population = GenomeRng::new(seed).random_population(&codec, size);

        prop_assert_eq!(population.len(), size);
        for individual in &population {
            prop_assert!(codec.check_shape(individual).is_ok());
            let assignment = codec.decode_individual(individual, &fixed).unwrap();
            for (name, value) in assignment.iter() {
                let candidates = space.get(name).unwrap();
                prop_assert!(candidates.values().contains(value));
            }
        }
    }

    #[test]
    fn test_crossover_and_mutation_keep_shape(
        exponents in prop::collection::vec(1u32..6, 1..5),
        crossover_rate in 0.0f64..=1.0,
        mutation_rate in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let (codec, _) = ChromosomeCodec::from_space(&space_from_exponents(&exponents)).unwrap();
        let mut rng = GenomeRng::new(seed);
        let parents = rng.random_population(&codec, 2);

        let (c1, c2) = rng.crossover(&parents[0], &parents[1], crossover_rate);
        let mut children = [c1, c2];
        rng.mutate(&mut children, mutation_rate);

        for child in &children {
            prop_assert!(codec.check_shape(child).is_ok());
        }
    }

    #[test]
    fn test_mutation_extremes(
        exponents in prop::collection::vec(1u32..6, 1..5),
        seed in any::<u64>(),
    ) {
        let (codec, _) = ChromosomeCodec::from_space(&space_from_exponents(&exponents)).unwrap();
        let mut rng = GenomeRng::new(seed);
        let original = rng.random_population(&codec, 4);

        let mut unchanged = original.clone();
        rng.mutate(&mut unchanged, 0.0);
        prop_assert_eq!(&unchanged, &original);

        let mut flipped = original.clone();
        rng.mutate(&mut flipped, 1.0);
        for (before, after) in original.iter().zip(&flipped) {
            for ((_, b), (_, a)) in before.genes().zip(after.genes()) {
                prop_assert!(b.bits().iter().zip(a.bits()).all(|(x, y)| x != y));
            }
        }
    }

    #[test]
    fn test_roulette_spin_in_range(
        fitness in prop::collection::vec(0.001f64..1000.0, 1..50),
        seed in any::<u64>(),
    ) {
        let wheel = RouletteWheel::new(&fitness).unwrap();
        let mut rng = GenomeRng::new(seed);
        for _ in 0..20 {
            prop_assert!(wheel.spin(rng.rng_mut()) < fitness.len());
        }
        let total: f64 = wheel.probabilities().iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_archive_holds_lowest_distinct(
        offers in prop::collection::vec(0usize..20, 0..100),
        capacity in 0usize..8,
    ) {
        // Each combination always scores the same, as a real fitness function would.
        let score = |index: usize| ((index * 7) % 11) as f64 + 1.0;
        let combination = |index: usize| -> ParameterAssignment {
            [("x", index as i64)].into_iter().collect()
        };

        let mut archive = TopFitArchive::new(capacity);
        for &index in &offers {
            archive.offer(score(index), &combination(index));
        }

        let mut distinct = offers.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let mut expected: Vec<f64> = distinct.into_iter().map(score).collect();
        expected.sort_by(f64::total_cmp);
        expected.truncate(capacity);

        let mut held = archive.fitness_values().to_vec();
        held.sort_by(f64::total_cmp);
        prop_assert_eq!(held, expected);

        let sets = archive.parameter_sets();
        for (i, a) in sets.iter().enumerate() {
            prop_assert!(sets[i + 1..].iter().all(|b| b != a));
        }
    }
}
