use super::{normalize, resolve_columns};

use std::str::FromStr;

use anyhow::Result;
use csv::StringRecord;
use rust_decimal::Decimal;

use crate::models::IngestError;

#[test]
fn test_resolve_columns_accepts_header_variants() -> Result<()> {
    let headers = StringRecord::from(vec!["Transaction-ID", "User", "Product", "DateTime", "Amount"]);

    assert!(resolve_columns(&headers).is_ok());

    Ok(())
}

#[test]
fn test_resolve_columns_missing_amount_fails_with_schema_error() {
    let headers = StringRecord::from(vec!["transaction_id", "user_id", "product_id", "timestamp"]);

    let result = resolve_columns(&headers);

    assert!(matches!(result, Err(IngestError::Schema { missing }) if missing.contains("transaction_amount")));
}

#[test]
fn test_normalize_maps_variant_headers_to_standard_fields() -> Result<()> {
    let raw = b"Transaction-ID,User,Product,DateTime,Amount\nt1,u1,p1,2025-02-02T12:00:00Z,10";

    let batch = normalize(raw)?;

    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.records[0].transaction_id, "t1");
    assert_eq!(batch.records[0].user_id, "u1");
    assert_eq!(batch.records[0].amount, Decimal::from_str("10")?);

    Ok(())
}

#[test]
fn test_normalize_drops_row_with_blank_required_field() -> Result<()> {
    let raw = b"transaction_id,user_id,product_id,timestamp,transaction_amount\n\
                 t1 ,u1,p1,2025-01-01T00:00:00Z,10.00\n\
                t2,  ,p2,2025-01-02T00:00:00Z,12.00";

    let batch = normalize(raw)?;

    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.rejected_rows, 1);
    assert_eq!(batch.records[0].transaction_id, "t1");

    Ok(())
}

#[test]
fn test_normalize_drops_rows_with_bad_amount_or_timestamp() -> Result<()> {
    let raw = b"transaction_id,user_id,product_id,timestamp,transaction_amount\n\
                1,u,p,not-a-date,9.99\n\
                2,u,p,2025-01-01T00:00:00Z,abc\n\
                3,u,p,2025-01-01T00:00:00Z,12.345";

    let batch = normalize(raw)?;

    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.rejected_rows, 2);
    assert_eq!(batch.records[0].transaction_id, "3");
    assert_eq!(batch.records[0].amount, Decimal::from_str("12.34")?);

    Ok(())
}

#[test]
fn test_normalize_preserves_zero_padded_identifiers() -> Result<()> {
    let raw = b"transaction_id,user_id,product_id,timestamp,transaction_amount\n0042,007,0001,2025-01-01,5.50";

    let batch = normalize(raw)?;

    assert_eq!(batch.records[0].transaction_id, "0042");
    assert_eq!(batch.records[0].user_id, "007");
    assert_eq!(batch.records[0].product_id, "0001");

    Ok(())
}

#[test]
fn test_normalize_accepts_bare_date_as_midnight_utc() -> Result<()> {
    let raw = b"transaction_id,user_id,product_id,timestamp,transaction_amount\nt1,u1,p1,2025-06-30,1.00";

    let batch = normalize(raw)?;

    assert_eq!(batch.records[0].timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(), "2025-06-30T00:00:00Z");

    Ok(())
}

#[test]
fn test_normalize_all_invalid_rows_fails_with_counted_rejects() {
    let raw = b"transaction_id,user_id,product_id,timestamp,transaction_amount\n\
                a,u,p,not-a-date,xyz\n\
                b,u,p,also-bad,1e";

    let result = normalize(raw);

    assert!(matches!(result, Err(IngestError::EmptyDataset { input_rows: 2 })));
}

#[test]
fn test_normalize_headers_only_fails_with_empty_dataset() {
    let raw = b"transaction_id,user_id,product_id,timestamp,transaction_amount\n";

    assert!(matches!(normalize(raw), Err(IngestError::EmptyDataset { .. })));
}

#[test]
fn test_normalize_blank_payload_fails_with_empty_dataset() {
    assert!(matches!(normalize(b""), Err(IngestError::EmptyDataset { .. })));
    assert!(matches!(normalize(b"  \n  "), Err(IngestError::EmptyDataset { .. })));
}
