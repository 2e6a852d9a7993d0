/// Failure reported by a [`DataSource`](crate::source::DataSource) while fetching a page.
///
/// Kept `Clone + PartialEq` so the last failure can live inside
/// [`PaginationState`](crate::pagination::PaginationState) and drive the retry prompt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataSourceError {
    #[error("page {page} is not a valid page number, pages start at 1")]
    InvalidPage { page: u32 },

    #[error("page {page} is unavailable: {reason}")]
    Unavailable { page: u32, reason: String },

    #[error("malformed purchase data: {reason}")]
    Malformed { reason: String },
}

impl From<serde_json::Error> for DataSourceError {
    fn from(e: serde_json::Error) -> Self {
        DataSourceError::Malformed {
            reason: e.to_string(),
        }
    }
}
