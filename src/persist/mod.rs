//! Persistence of intermediate search state.
//!
//! The engine writes two artifacts at the configured cadence:
//!
//! ```text
//! <stem>.pop   JSON array of individuals, one object per individual:
//!              {"a": "0110", "b": "1"}  (parameter -> chromosome bits)
//!
//! <stem>.fit   Tab-separated top-fit report, ascending by fitness:
//!              fitness   a    b
//!              11.000000 1    10
//! ```
//!
//! A saved `.pop` file can seed the initial generation of a later run.

mod population;
mod report;

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::evolution::TopFitArchive;
use crate::schema::Population;

pub use population::JsonPopulationStore;
pub use report::TsvReport;

/// Saves and restores whole populations.
pub trait PopulationStore {
    fn save(&self, population: &Population) -> Result<(), PersistError>;
    fn load(&self) -> Result<Population, PersistError>;
}

/// Writes the top-fit archive as a report.
pub trait ReportSink {
    fn save(&self, archive: &TopFitArchive) -> Result<(), PersistError>;
}

/// Persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid population file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write report {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// `<stem>.<extension>` without replacing any dot already in the stem.
pub fn with_suffix(stem: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// File-backed collaborators for an output stem: `<stem>.pop` and `<stem>.fit`.
pub fn file_outputs(stem: &Path) -> (JsonPopulationStore, TsvReport) {
    (
        JsonPopulationStore::new(with_suffix(stem, "pop")),
        TsvReport::new(with_suffix(stem, "fit")),
    )
}
