//! Tab-separated top-fit report.

use std::io::Write;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::evolution::TopFitArchive;

use super::{PersistError, ReportSink};

/// Writes the archive as `fitness<TAB>param1<TAB>param2...`, best first,
/// with fitness rendered to six decimals.
#[derive(Debug, Clone)]
pub struct TsvReport {
    path: PathBuf,
}

impl TsvReport {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the report to any writer.
    pub fn write_to<W: Write>(archive: &TopFitArchive, writer: W) -> Result<(), csv::Error> {
        let entries = archive.entries();
        let columns: Vec<String> = entries
            .first()
            .map(|e| e.params.names().map(str::to_string).collect())
            .unwrap_or_default();

        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(writer);

        writer.write_record(std::iter::once("fitness").chain(columns.iter().map(String::as_str)))?;
        for entry in &entries {
            let mut record = Vec::with_capacity(columns.len() + 1);
            record.push(format!("{:.6}", entry.fitness));
            for column in &columns {
                record.push(
                    entry
                        .params
                        .get(column)
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                );
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ReportSink for TsvReport {
    fn save(&self, archive: &TopFitArchive) -> Result<(), PersistError> {
        let file = std::fs::File::create(&self.path).map_err(|source| PersistError::Io {
            path: self.path.clone(),
            source,
        })?;
        Self::write_to(archive, file).map_err(|source| PersistError::Csv {
            path: self.path.clone(),
            source,
        })?;
        log::debug!(
            "Saved {} top-fit entries to {}",
            archive.len(),
            self.path.display()
        );
        Ok(())
    }
}
