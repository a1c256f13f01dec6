mod errors;
mod manifest;
mod record;
mod report;

use serde::{Deserialize, Serialize};

pub use errors::{CommitError, IngestError, QueryError};
pub use manifest::ManifestEntry;
pub use record::TransactionRecord;
pub use report::{IngestReport, Statistics};

/// The recorded result of a single ingestion attempt.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IngestOutcome {
    Accepted,
    DuplicateSkipped,
    Rejected
}

impl IngestOutcome {
    /// The wire spelling used in the manifest log and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::DuplicateSkipped => "duplicate-skipped",
            Self::Rejected => "rejected"
        }
    }
}
