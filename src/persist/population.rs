//! JSON population files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::Population;

use super::{PersistError, PopulationStore};

/// Stores a population as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonPopulationStore {
    path: PathBuf,
}

impl JsonPopulationStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> PersistError {
        PersistError::Json {
            path: self.path.clone(),
            source,
        }
    }
}

impl PopulationStore for JsonPopulationStore {
    fn save(&self, population: &Population) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(population).map_err(|e| self.json_error(e))?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;
        log::debug!(
            "Saved {} individuals to {}",
            population.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> Result<Population, PersistError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let population: Population =
            serde_json::from_str(&content).map_err(|e| self.json_error(e))?;
        log::info!(
            "Loaded {} individuals from {}",
            population.len(),
            self.path.display()
        );
        Ok(population)
    }
}
