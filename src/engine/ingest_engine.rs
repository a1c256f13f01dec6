use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::fingerprint;
use crate::locks::LockRegistry;
use crate::models::{IngestError, IngestOutcome, IngestReport, ManifestEntry};
use crate::normalizer;
use crate::storage::{DatasetStore, ManifestLog};

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for an engine instance.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub lock_timeout: Duration
}

impl IngestConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

/// Orchestrates the ingestion pipeline end to end.
///
/// Validation and fingerprinting run without any lock held. The fingerprint
/// lock serializes identical submissions so only the first performs the
/// commit; the global commit lock serializes the publish critical section
/// itself. Both guards are scoped, so every exit path releases them.
pub struct IngestEngine {
    locks: LockRegistry,
    dataset: DatasetStore,
    manifest: ManifestLog
}

impl IngestEngine {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            locks: LockRegistry::new(config.lock_timeout),
            dataset: DatasetStore::new(&config.data_dir),
            manifest: ManifestLog::new(&config.data_dir)
        }
    }

    pub fn dataset(&self) -> &DatasetStore {
        &self.dataset
    }

    pub fn manifest(&self) -> &ManifestLog {
        &self.manifest
    }

    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    /// Ingests one raw delimited payload.
    ///
    /// A resubmission of already-accepted content is a success with the
    /// `DuplicateSkipped` outcome and never touches the dataset.
    ///
    /// # Errors
    /// - `UnreadableCsv`, `Schema`, `EmptyDataset`: the upload is rejected,
    ///   nothing is committed, and a rejected manifest entry is recorded.
    /// - `LockTimeout`: contention exceeded the configured bound; retryable.
    /// - `Commit`: staging or publish failed; the previously published
    ///   dataset remains authoritative and the attempt may be retried.
    pub async fn ingest(&self, raw: &[u8]) -> Result<IngestReport, IngestError> {
        let batch = match normalizer::normalize(raw) {
            Ok(batch) => batch,
            Err(error) => {
                self.record_rejected(raw, &error).await;
                return Err(error);
            }
        };

        let fingerprint = fingerprint::of_batch(&batch.records);

        // Identical submissions queue up here; only the first one past this
        // point performs the commit.
        let _dedup_guard = self.locks.lock_fingerprint(&fingerprint).await?;

        if let Some(original) = self.manifest.find_accepted(&fingerprint)? {
            let entry = ManifestEntry::duplicate_skipped(
                fingerprint.clone(),
                original.accepted_row_count,
                original.rejected_row_count
            );

            {
                let _commit_guard = self.locks.lock_commit().await?;
                self.manifest.append(&entry)?;
            }

            self.locks.evict(&fingerprint);

            info!("Skipped duplicate upload [{fingerprint}]");

            return Ok(IngestReport {
                outcome: IngestOutcome::DuplicateSkipped,
                fingerprint,
                accepted_rows: original.accepted_row_count,
                rejected_rows: original.rejected_row_count
            });
        }

        let accepted_rows = batch.records.len() as u64;

        {
            let _commit_guard = self.locks.lock_commit().await?;

            let total = self.dataset.append_atomic(&batch.records)?;
            let entry = ManifestEntry::accepted(fingerprint.clone(), accepted_rows, batch.rejected_rows);
            self.manifest.append(&entry)?;

            debug!("Dataset now holds {total} rows");
        }

        self.locks.evict(&fingerprint);

        info!(
            "Accepted upload [{fingerprint}]: {accepted_rows} rows appended, {} rows dropped",
            batch.rejected_rows
        );

        Ok(IngestReport {
            outcome: IngestOutcome::Accepted,
            fingerprint,
            accepted_rows,
            rejected_rows: batch.rejected_rows
        })
    }

    /// Records a rejected attempt in the manifest. The dataset is never
    /// touched on this path; the entry is keyed by the digest of the raw
    /// payload since no normalized batch exists.
    async fn record_rejected(&self, raw: &[u8], error: &IngestError) {
        let rejected_rows = match error {
            IngestError::EmptyDataset { input_rows } => *input_rows,
            _ => 0
        };

        let entry = ManifestEntry::rejected(fingerprint::of_bytes(raw), rejected_rows);

        match self.locks.lock_commit().await {
            Ok(_commit_guard) => {
                if let Err(append_error) = self.manifest.append(&entry) {
                    warn!("Could not record rejected upload in manifest: {append_error}");
                }
            }
            Err(lock_error) => {
                warn!("Could not record rejected upload in manifest: {lock_error}");
            }
        }
    }
}
