use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a single fully-normalized transaction row.
///
/// Every field is required; a record only exists once the normalizer has
/// trimmed, coerced, and validated the raw input. Identifier fields stay
/// opaque strings so values like `"007"` keep their exact textual form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique identifier of the transaction, preserved verbatim.
    pub transaction_id: String,
    /// The user the transaction belongs to, preserved verbatim.
    pub user_id: String,
    /// The product involved, preserved verbatim.
    pub product_id: String,
    /// When the transaction occurred, normalized to UTC.
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    /// The transaction amount, normalized to two decimal places.
    #[serde(rename = "transaction_amount", with = "amount_format")]
    pub amount: Decimal
}

/// Serializes amounts as plain decimal strings and deserializes them back at
/// exactly two decimal places. Driving the parse through `Decimal::from_str`
/// keeps the CSV deserializer off the float path, which would otherwise read
/// `10.00` back as `10` and lose the uniform on-disk scale.
mod amount_format {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        let mut amount = Decimal::from_str(&value).map_err(de::Error::custom)?;
        amount.rescale(2);

        Ok(amount)
    }
}

/// Serializes timestamps as `2025-01-01T00:00:00Z`, the uniform on-disk
/// format of the dataset.
mod timestamp_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&value, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(de::Error::custom)
    }
}
