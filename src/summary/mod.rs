#[cfg(test)]
mod tests;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{QueryError, Statistics};
use crate::storage::DatasetStore;

/// Read-only consumer of the published dataset.
///
/// Each query snapshots the dataset once at the start, so commits that begin
/// afterwards never bleed into the result.
pub struct SummaryAggregator {
    dataset: DatasetStore
}

impl SummaryAggregator {
    pub fn new(dataset: DatasetStore) -> Self {
        Self { dataset }
    }

    /// Computes `count`, `min`, `max`, `mean`, and `total` over the amounts
    /// of one user's records, optionally bounded to `[from, to]` by date.
    /// Either bound may be omitted independently.
    ///
    /// # Errors
    /// - `InvalidRange` when `from` is after `to`.
    /// - `EmptyResult` when no record matches, including an unknown user or a
    ///   dataset that has never been published. Callers can distinguish "no
    ///   data" from an all-zero result.
    pub fn summarize(&self, user_id: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Statistics, QueryError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(QueryError::InvalidRange { from, to });
            }
        }

        let records = self.dataset.read_all()?;

        let amounts: Vec<Decimal> = records.iter()
            .filter(|record| record.user_id == user_id)
            .filter(|record| {
                let date = record.timestamp.date_naive();
                from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
            })
            .map(|record| record.amount)
            .collect();

        if amounts.is_empty() {
            return Err(QueryError::EmptyResult { user_id: user_id.to_string() });
        }

        let count = amounts.len() as u64;
        let total: Decimal = amounts.iter().sum();
        let min = amounts.iter().copied().min().unwrap_or(total);
        let max = amounts.iter().copied().max().unwrap_or(total);
        let mean = (total / Decimal::from(count)).round_dp(2);

        Ok(Statistics { count, min, max, mean, total })
    }
}
