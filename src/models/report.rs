use rust_decimal::Decimal;
use serde::Serialize;

use crate::fingerprint::Fingerprint;
use crate::models::IngestOutcome;

/// The result handed back to the caller after a successful ingestion attempt.
///
/// A `DuplicateSkipped` report carries the counts of the original accepted
/// upload, so a resubmission observes the same logical result.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub outcome: IngestOutcome,
    pub fingerprint: Fingerprint,
    pub accepted_rows: u64,
    pub rejected_rows: u64
}

/// Per-user aggregate statistics over the `amount` column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub count: u64,
    pub min: Decimal,
    pub max: Decimal,
    pub mean: Decimal,
    pub total: Decimal
}
