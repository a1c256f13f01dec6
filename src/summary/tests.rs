use super::SummaryAggregator;

use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::{TempDir, tempdir};

use crate::models::QueryError;
use crate::storage::DatasetStore;

fn date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value, "%Y-%m-%d")?)
}

/// Seeds a dataset with known rows for user "200" across several dates plus
/// one row for an unrelated user.
fn seeded_aggregator() -> Result<(TempDir, SummaryAggregator)> {
    let dir = tempdir()?;
    let dataset = DatasetStore::new(dir.path());

    let rows = [
        ("t1", "200", "2025-01-10", "10.00"),
        ("t2", "200", "2025-01-20", "20.00"),
        ("t3", "200", "2025-02-05", "5.50"),
        ("t4", "999", "2025-01-15", "100.00")
    ];

    let records = rows.iter().map(|(transaction_id, user_id, day, amount)| {
        Ok(crate::models::TransactionRecord {
            transaction_id: transaction_id.to_string(),
            user_id: user_id.to_string(),
            product_id: "p1".to_string(),
            timestamp: date(day)?
                .and_hms_opt(12, 30, 0)
                .ok_or_else(|| anyhow::anyhow!("invalid time"))?
                .and_utc(),
            amount: Decimal::from_str(amount)?
        })
    }).collect::<Result<Vec<_>>>()?;

    dataset.append_atomic(&records)?;

    let aggregator = SummaryAggregator::new(dataset);

    Ok((dir, aggregator))
}

#[test]
fn test_unbounded_summary_matches_hand_computed_values() -> Result<()> {
    let (_dir, aggregator) = seeded_aggregator()?;

    let statistics = aggregator.summarize("200", None, None)?;

    assert_eq!(statistics.count, 3);
    assert_eq!(statistics.min, Decimal::from_str("5.50")?);
    assert_eq!(statistics.max, Decimal::from_str("20.00")?);
    assert_eq!(statistics.total, Decimal::from_str("35.50")?);
    assert_eq!(statistics.mean, Decimal::from_str("11.83")?);

    Ok(())
}

#[test]
fn test_both_bounds_filter_to_january_rows() -> Result<()> {
    let (_dir, aggregator) = seeded_aggregator()?;

    let statistics = aggregator.summarize("200", Some(date("2025-01-01")?), Some(date("2025-01-31")?))?;

    assert_eq!(statistics.count, 2);
    assert_eq!(statistics.min, Decimal::from_str("10.00")?);
    assert_eq!(statistics.max, Decimal::from_str("20.00")?);
    assert_eq!(statistics.total, Decimal::from_str("30.00")?);
    assert_eq!(statistics.mean, Decimal::from_str("15.00")?);

    Ok(())
}

#[test]
fn test_bounds_are_inclusive() -> Result<()> {
    let (_dir, aggregator) = seeded_aggregator()?;

    let statistics = aggregator.summarize("200", Some(date("2025-01-10")?), Some(date("2025-01-20")?))?;

    assert_eq!(statistics.count, 2);

    Ok(())
}

#[test]
fn test_each_bound_can_be_omitted_independently() -> Result<()> {
    let (_dir, aggregator) = seeded_aggregator()?;

    let from_only = aggregator.summarize("200", Some(date("2025-01-15")?), None)?;
    assert_eq!(from_only.count, 2);
    assert_eq!(from_only.total, Decimal::from_str("25.50")?);

    let to_only = aggregator.summarize("200", None, Some(date("2025-01-15")?))?;
    assert_eq!(to_only.count, 1);
    assert_eq!(to_only.total, Decimal::from_str("10.00")?);

    Ok(())
}

#[test]
fn test_out_of_range_filter_is_empty_result_not_zeros() -> Result<()> {
    let (_dir, aggregator) = seeded_aggregator()?;

    let result = aggregator.summarize("200", Some(date("2030-01-01")?), Some(date("2030-12-31")?));

    assert!(matches!(result, Err(QueryError::EmptyResult { .. })));

    Ok(())
}

#[test]
fn test_unknown_user_is_empty_result() -> Result<()> {
    let (_dir, aggregator) = seeded_aggregator()?;

    let result = aggregator.summarize("does-not-exist", None, None);

    assert!(matches!(result, Err(QueryError::EmptyResult { user_id }) if user_id == "does-not-exist"));

    Ok(())
}

#[test]
fn test_inverted_bounds_fail_with_invalid_range() -> Result<()> {
    let (_dir, aggregator) = seeded_aggregator()?;

    let result = aggregator.summarize("200", Some(date("2025-02-01")?), Some(date("2025-01-01")?));

    assert!(matches!(result, Err(QueryError::InvalidRange { .. })));

    Ok(())
}

#[test]
fn test_unpublished_dataset_is_empty_result() -> Result<()> {
    let dir = tempdir()?;
    let aggregator = SummaryAggregator::new(DatasetStore::new(dir.path()));

    let result = aggregator.summarize("200", None, None);

    assert!(matches!(result, Err(QueryError::EmptyResult { .. })));

    Ok(())
}
