use std::fs;
use std::path::{Path, PathBuf};

use csv::{Reader, Writer};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::models::{CommitError, TransactionRecord};

const DATASET_FILE: &str = "transactions.csv";

/// Owns the published dataset file and the staging discipline around it.
///
/// A new version is always materialized into a uniquely named staging file in
/// the same directory, then published with a single atomic replace. Readers
/// at any instant see either the old version or the new one in full, never a
/// half-written file, even across a crash mid-publish.
pub struct DatasetStore {
    path: PathBuf
}

impl DatasetStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(DATASET_FILE)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record of the currently published version.
    ///
    /// The file is opened once, so the result is a consistent snapshot even
    /// if a publish lands while the caller is still iterating. A dataset that
    /// has never been published reads as empty.
    pub fn read_all(&self) -> Result<Vec<TransactionRecord>, csv::Error> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = Reader::from_path(&self.path)?;
        let mut records = Vec::new();

        for record in reader.deserialize::<TransactionRecord>() {
            records.push(record?);
        }

        Ok(records)
    }

    /// Merges the batch with the published dataset and publishes the result
    /// atomically. Must only be called inside the commit critical section.
    ///
    /// Returns the total row count of the new version.
    ///
    /// # Errors
    /// Any staging or publish failure aborts the attempt with `CommitError`;
    /// the staging file is removed and the previously published version
    /// remains authoritative.
    pub fn append_atomic(&self, batch: &[TransactionRecord]) -> Result<u64, CommitError> {
        let existing = self.read_all()?;

        let data_dir = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(data_dir)?;

        // Staging lives next to the final path so the replace stays on one
        // filesystem; the tempfile is removed on every early return.
        let mut staging = NamedTempFile::new_in(data_dir)?;

        {
            let mut writer = Writer::from_writer(staging.as_file_mut());

            for record in existing.iter().chain(batch) {
                writer.serialize(record)?;
            }

            writer.flush()?;
        }

        staging.as_file().sync_all()?;
        staging.persist(&self.path)?;

        let total = (existing.len() + batch.len()) as u64;

        debug!("Published dataset version with {total} rows at {}", self.path.display());

        Ok(total)
    }
}
