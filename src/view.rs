use crate::config::Labels;
use crate::pagination::PaginationState;
use crate::record::PurchaseRecord;
use chrono::{DateTime, Utc};

/// Amount followed by the currency suffix, e.g. `3000원`.
pub fn format_price(amount: u64, suffix: &str) -> String {
    format!("{amount}{suffix}")
}

/// Calendar date of the UTC timestamp as `YYYY-MM-DD`.
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub key: String,
    pub name: String,
    pub price_text: String,
    pub date_text: String,
}

impl RowView {
    pub fn from_record(record: &PurchaseRecord, labels: &Labels) -> Self {
        Self {
            key: record.product_id.clone(),
            name: record.product_name.clone(),
            price_text: format_price(record.price, &labels.currency_suffix),
            date_text: format_date(&record.bought_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub rows: Vec<RowView>,
    pub total_text: String,
    pub show_loading: bool,
    pub show_end: bool,
    /// Present while a failed fetch waits for a retry.
    pub error_text: Option<String>,
}

impl ListView {
    pub fn from_state(state: &PaginationState, labels: &Labels) -> Self {
        Self {
            rows: state
                .items()
                .iter()
                .map(|record| RowView::from_record(record, labels))
                .collect(),
            total_text: format_price(state.total_price(), &labels.currency_suffix),
            show_loading: state.is_loading(),
            show_end: state.is_exhausted(),
            error_text: state.last_error().map(|e| e.to_string()),
        }
    }
}
