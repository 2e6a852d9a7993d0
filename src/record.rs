use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One purchased product as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    /// Unique within a list; also used as the row key.
    pub product_id: String,
    pub product_name: String,
    /// Whole currency units, never negative.
    pub price: u64,
    pub bought_date: DateTime<Utc>,
}

/// Sum of `price` over a batch, saturating at `u64::MAX`.
pub fn batch_total(records: &[PurchaseRecord]) -> u64 {
    records
        .iter()
        .fold(0u64, |acc, record| acc.saturating_add(record.price))
}
