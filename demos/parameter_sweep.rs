//! Parameter sweep over a five-parameter model.
//!
//! Writes `result.pop` and `result.fit` to the working directory and reseeds
//! from `result.pop` when a previous run left one behind.

use std::path::Path;

use param_evolve::{
    EvolutionConfig, EvolutionEngine, ParameterAssignment, ParameterSpace,
    evolution::{BoxError, LogProgress},
    schema::{
        ArchiveConfig, GeneticAlgorithmConfig, PersistenceConfig, PopulationConfig, evenly_spaced,
    },
};

fn integers(start: f64, end: f64, count: usize) -> Result<Vec<i64>, BoxError> {
    Ok(evenly_spaced(start, end, count)?
        .into_iter()
        .map(|v| v as i64)
        .collect())
}

fn model(p: &ParameterAssignment) -> Result<f64, BoxError> {
    let get = |name: &str| {
        p.get_f64(name)
            .ok_or_else(|| BoxError::from(format!("missing numeric parameter `{name}`")))
    };
    Ok((get("a")? * get("b")?.sqrt() * get("c")? * get("d")? + get("e")?).sqrt())
}

fn main() -> Result<(), BoxError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let space = ParameterSpace::new()
        .with("a", integers(1.0, 64.0, 64)?)
        .with("b", integers(11.0, 18.0, 8)?)
        .with("c", [2.5])
        .with("d", integers(100.0, 200.0, 128)?)
        .with_fixed("e", 1.25);

    let previous = Path::new("result.pop");
    let config = EvolutionConfig {
        population: PopulationConfig {
            size: 50,
            generations: 50,
        },
        genetic: GeneticAlgorithmConfig {
            crossover_rate: 0.5,
            mutation_rate: 0.05,
        },
        archive: ArchiveConfig { top_k: 25 },
        persistence: PersistenceConfig {
            save_every: 5,
            output_stem: Some("result".into()),
            initial_population: previous.exists().then(|| previous.to_path_buf()),
        },
        random_seed: Some(2016),
        ..Default::default()
    };

    let mut engine = EvolutionEngine::from_config(config, &space)?;
    let result = engine.run_with_progress(&model, &LogProgress)?;

    println!("Evaluations:  {}", result.stats.total_evaluations);
    println!("Elapsed:      {:.2}s", result.stats.elapsed_seconds);
    for entry in result.archive.iter().take(5) {
        println!("{:>12.6}  {}", entry.fitness, entry.params);
    }

    Ok(())
}
