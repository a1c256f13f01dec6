use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::models::IngestOutcome;

/// One audit record in the append-only manifest log.
///
/// An entry is written exactly once per ingestion attempt and is immutable
/// thereafter. Accepted entries double as the dedup index: a later upload
/// whose fingerprint matches an accepted entry is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Content digest of the batch this attempt carried.
    pub fingerprint: Fingerprint,
    /// When the attempt was recorded, UTC.
    pub timestamp: DateTime<Utc>,
    /// How the attempt ended.
    pub outcome: IngestOutcome,
    /// Rows appended to the dataset (zero unless accepted).
    pub accepted_row_count: u64,
    /// Rows dropped during validation.
    pub rejected_row_count: u64
}

impl ManifestEntry {
    pub fn accepted(fingerprint: Fingerprint, accepted_row_count: u64, rejected_row_count: u64) -> Self {
        Self {
            fingerprint,
            timestamp: Utc::now(),
            outcome: IngestOutcome::Accepted,
            accepted_row_count,
            rejected_row_count
        }
    }

    /// Records a resubmission that was skipped; the counts echo the original
    /// accepted entry so the caller receives the same logical result.
    pub fn duplicate_skipped(fingerprint: Fingerprint, accepted_row_count: u64, rejected_row_count: u64) -> Self {
        Self {
            fingerprint,
            timestamp: Utc::now(),
            outcome: IngestOutcome::DuplicateSkipped,
            accepted_row_count,
            rejected_row_count
        }
    }

    pub fn rejected(fingerprint: Fingerprint, rejected_row_count: u64) -> Self {
        Self {
            fingerprint,
            timestamp: Utc::now(),
            outcome: IngestOutcome::Rejected,
            accepted_row_count: 0,
            rejected_row_count
        }
    }
}
