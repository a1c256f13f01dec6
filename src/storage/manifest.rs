use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::fingerprint::Fingerprint;
use crate::models::{CommitError, IngestOutcome, ManifestEntry};

const MANIFEST_FILE: &str = "manifest.jsonl";

/// The append-only audit log, one JSON object per line.
///
/// Entries are never mutated, reordered, or deleted. Appends happen under the
/// global commit lock as a single write of one full line followed by a sync,
/// so a crash mid-append can at worst leave a truncated trailing line, which
/// the read path skips.
pub struct ManifestLog {
    path: PathBuf
}

impl ManifestLog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(MANIFEST_FILE)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry as a complete line.
    pub fn append(&self, entry: &ManifestEntry) -> Result<(), CommitError> {
        if let Some(data_dir) = self.path.parent() {
            fs::create_dir_all(data_dir)?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.write_all(line.as_bytes())?;
        file.sync_all()?;

        Ok(())
    }

    /// Finds the accepted entry for a fingerprint, if any. This is the dedup
    /// check: a hit means the content is already part of the dataset.
    pub fn find_accepted(&self, fingerprint: &Fingerprint) -> Result<Option<ManifestEntry>, CommitError> {
        Ok(self.entries()?.into_iter().find(|entry| {
            entry.outcome == IngestOutcome::Accepted && entry.fingerprint == *fingerprint
        }))
    }

    /// Reads every decodable entry in append order. Blank or corrupt lines
    /// are skipped with a warning rather than failing the whole read.
    pub fn entries(&self) -> Result<Vec<ManifestEntry>, CommitError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let mut entries = Vec::new();

        for line in contents.lines() {
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<ManifestEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(error) => warn!("Skipping undecodable manifest line: {error}")
            }
        }

        Ok(entries)
    }
}
