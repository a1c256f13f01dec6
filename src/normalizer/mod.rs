#[cfg(test)]
mod tests;

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{IngestError, TransactionRecord};

/// Accepted header spellings for each logical field, matched after
/// lowercasing and trimming the incoming headers.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("transaction_id", &["transaction_id", "transactionid", "transaction-id", "transaction id"]),
    ("user_id", &["user_id", "userid", "user-id", "user id", "user"]),
    ("product_id", &["product_id", "productid", "product-id", "product id", "product"]),
    ("timestamp", &["timestamp", "time_stamp", "date", "datetime", "time stamp"]),
    ("transaction_amount", &["transaction_amount", "amount", "value", "price", "transaction amount"])
];

/// Positions of the required logical fields within the incoming header row.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    transaction_id: usize,
    user_id: usize,
    product_id: usize,
    timestamp: usize,
    amount: usize
}

/// A validated batch ready for fingerprinting and commit.
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub records: Vec<TransactionRecord>,
    /// Rows dropped because a required field was blank or failed coercion.
    pub rejected_rows: u64
}

/// Resolves each required logical field to a column position, accepting any
/// of its configured header variants.
///
/// # Errors
/// Returns `IngestError::Schema` naming every unresolvable field.
pub fn resolve_columns(headers: &StringRecord) -> Result<ColumnMap, IngestError> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    let mut resolved = [0usize; 5];
    let mut missing = Vec::new();

    for (slot, &(field, variants)) in REQUIRED_COLUMNS.iter().enumerate() {
        match position(&lowered, field, variants) {
            Ok(index) => resolved[slot] = index,
            Err(field) => missing.push(field.to_string())
        }
    }

    if !missing.is_empty() {
        return Err(IngestError::Schema { missing: missing.join(", ") });
    }

    Ok(ColumnMap {
        transaction_id: resolved[0],
        user_id: resolved[1],
        product_id: resolved[2],
        timestamp: resolved[3],
        amount: resolved[4]
    })
}

fn position(lowered: &[String], field: &'static str, variants: &[&str]) -> Result<usize, &'static str> {
    variants.iter()
        .find_map(|variant| lowered.iter().position(|header| header == variant))
        .ok_or(field)
}

/// Parses and validates a raw delimited payload into a normalized batch.
///
/// Individual invalid rows are dropped and counted; the whole payload is
/// rejected only when the headers cannot be resolved or no valid row remains.
/// Pure transformation, nothing is written anywhere.
pub fn normalize(raw: &[u8]) -> Result<NormalizedBatch, IngestError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::EmptyDataset { input_rows: 0 });
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(raw);

    let headers = reader.headers()?.clone();
    let columns = resolve_columns(&headers)?;

    let mut records = Vec::new();
    let mut rejected_rows = 0u64;

    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(error) => {
                warn!("Dropping unreadable row: {error}");
                rejected_rows += 1;
                continue;
            }
        };

        match parse_row(&row, &columns) {
            Some(record) => records.push(record),
            None => rejected_rows += 1
        }
    }

    if records.is_empty() {
        return Err(IngestError::EmptyDataset { input_rows: rejected_rows });
    }

    Ok(NormalizedBatch { records, rejected_rows })
}

fn parse_row(row: &StringRecord, columns: &ColumnMap) -> Option<TransactionRecord> {
    let field = |index: usize| row.get(index).map(str::trim).unwrap_or("");

    let transaction_id = field(columns.transaction_id);
    let user_id = field(columns.user_id);
    let product_id = field(columns.product_id);
    let timestamp = field(columns.timestamp);
    let amount = field(columns.amount);

    if [transaction_id, user_id, product_id, timestamp, amount].iter().any(|v| v.is_empty()) {
        return None;
    }

    let timestamp = parse_timestamp(timestamp)?;

    // Amounts are held at exactly two decimal places so the same value always
    // renders identically on disk and in the fingerprint.
    let mut amount = Decimal::from_str(amount).ok()?.round_dp(2);
    amount.rescale(2);

    Some(TransactionRecord {
        transaction_id: transaction_id.to_string(),
        user_id: user_id.to_string(),
        product_id: product_id.to_string(),
        timestamp,
        amount
    })
}

/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` timestamps, and
/// bare `YYYY-MM-DD` dates (taken as midnight UTC).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
