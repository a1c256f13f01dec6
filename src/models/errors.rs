use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the ingestion pipeline.
///
/// A resubmission of already-accepted content is not an error; it surfaces as
/// the `DuplicateSkipped` outcome on a successful [`crate::models::IngestReport`].
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Payload could not be parsed as CSV: {0}")]
    UnreadableCsv(#[from] csv::Error),
    #[error("Required columns could not be resolved: [{missing}]")]
    Schema {
        missing: String
    },
    #[error("No valid rows remain after validation ({input_rows} rows rejected)")]
    EmptyDataset {
        input_rows: u64
    },
    #[error("Timed out waiting for the {lock} lock after {timeout:?}")]
    LockTimeout {
        lock: &'static str,
        timeout: Duration
    },
    #[error("Commit failed, the previously published dataset remains authoritative: {0}")]
    Commit(#[from] CommitError)
}

/// Failures while staging or publishing a new dataset version.
///
/// Any of these abort the attempt before the atomic replace, so readers keep
/// observing the previous version untouched.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Dataset I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Dataset encoding failed: {0}")]
    Encode(#[from] csv::Error),
    #[error("Manifest entry could not be serialized: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("Staging file could not be published: {0}")]
    Publish(#[from] tempfile::PersistError)
}

/// Errors raised by the summary read path.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid date range: from [{from}] is after to [{to}]")]
    InvalidRange {
        from: NaiveDate,
        to: NaiveDate
    },
    #[error("No records found for user [{user_id}] in the requested range")]
    EmptyResult {
        user_id: String
    },
    #[error("Dataset could not be read: {0}")]
    Dataset(#[from] csv::Error)
}
