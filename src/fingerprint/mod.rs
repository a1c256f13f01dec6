
use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::TransactionRecord;

/// A SHA-256 content digest, lowercase hex encoded.
///
/// Used both as the dedup key checked against the manifest log and as the
/// name of the per-fingerprint lock.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Computes the fingerprint of a normalized batch.
///
/// Rows are rendered in a fixed column order and sorted before hashing, so
/// two batches with identical content fingerprint identically regardless of
/// the order rows arrived in.
pub fn of_batch(records: &[TransactionRecord]) -> Fingerprint {
    let mut lines: Vec<String> = records.iter().map(canonical_line).collect();
    lines.sort_unstable();

    let mut hasher = Sha256::new();

    for line in &lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }

    Fingerprint(hex::encode(hasher.finalize()))
}

/// Digest of a raw payload, used to key manifest entries for uploads that
/// were rejected before a normalized batch existed.
pub fn of_bytes(raw: &[u8]) -> Fingerprint {
    Fingerprint(hex::encode(Sha256::digest(raw)))
}

fn canonical_line(record: &TransactionRecord) -> String {
    format!(
        "{}\x1f{}\x1f{}\x1f{}\x1f{}",
        record.transaction_id,
        record.user_id,
        record.product_id,
        record.timestamp.format("%Y-%m-%dT%H:%M:%SZ"),
        record.amount
    )
}
