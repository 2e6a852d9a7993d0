use crate::error::DataSourceError;
use crate::record::{batch_total, PurchaseRecord};
use crate::source::{DataSource, Page};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do with the items carried by the page that reports `is_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalBatch {
    /// Drop the terminal batch and only mark the list exhausted.
    #[default]
    Discard,
    /// Append the terminal batch, then mark the list exhausted.
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub terminal_batch: TerminalBatch,
}

/// Snapshot of the fields that decide whether another fetch may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchGuard {
    pub loading: bool,
    pub exhausted: bool,
    pub failed: bool,
}

impl FetchGuard {
    pub fn allows_fetch(&self) -> bool {
        !self.loading && !self.exhausted && !self.failed
    }
}

/// Result of one pass through the fetch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The guard blocked the fetch; nothing was requested.
    Skipped,
    /// A regular page was appended and the cursor advanced.
    Appended { count: usize },
    /// The source reported the end. `appended` is non-zero only under
    /// [`TerminalBatch::Append`].
    Exhausted { appended: usize },
    /// The source failed; the error is kept in the state.
    Failed,
    /// A completion arrived while no fetch was in flight.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    items: Vec<PurchaseRecord>,
    page_cursor: u32,
    total_price: u64,
    loading: bool,
    exhausted: bool,
    last_error: Option<DataSourceError>,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            page_cursor: 1,
            total_price: 0,
            loading: false,
            exhausted: false,
            last_error: None,
        }
    }

    pub fn items(&self) -> &[PurchaseRecord] {
        &self.items
    }

    /// Next page to request.
    pub fn page_cursor(&self) -> u32 {
        self.page_cursor
    }

    pub fn total_price(&self) -> u64 {
        self.total_price
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn last_error(&self) -> Option<&DataSourceError> {
        self.last_error.as_ref()
    }

    pub fn guard(&self) -> FetchGuard {
        FetchGuard {
            loading: self.loading,
            exhausted: self.exhausted,
            failed: self.last_error.is_some(),
        }
    }

    pub fn can_fetch(&self) -> bool {
        self.guard().allows_fetch()
    }

    /// Start a fetch if the guard allows it and return the page to request.
    ///
    /// Returns `None` without touching the state while loading, once
    /// exhausted, or while a failure is waiting for [`retry`](Self::retry).
    pub fn begin_fetch(&mut self) -> Option<u32> {
        if !self.can_fetch() {
            return None;
        }
        self.loading = true;
        debug!(page = self.page_cursor, "requesting purchase page");
        Some(self.page_cursor)
    }

    /// Clear a recorded failure and start a fetch for the same page.
    pub fn retry(&mut self) -> Option<u32> {
        if self.loading {
            return None;
        }
        self.last_error = None;
        self.begin_fetch()
    }

    /// Fold the result of the in-flight fetch into the state.
    pub fn finish_fetch(
        &mut self,
        result: Result<Page, DataSourceError>,
        config: &PaginationConfig,
    ) -> FetchOutcome {
        if !self.loading {
            warn!("dropping page result that arrived with no fetch in flight");
            return FetchOutcome::Ignored;
        }
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!(page = self.page_cursor, error = %e, "failed to fetch purchase page");
                self.last_error = Some(e);
                return FetchOutcome::Failed;
            }
        };

        if page.is_end {
            self.exhausted = true;
            let appended = match config.terminal_batch {
                TerminalBatch::Discard => 0,
                TerminalBatch::Append => self.append(page.items),
            };
            debug!(page = self.page_cursor, appended, "purchase list exhausted");
            return FetchOutcome::Exhausted { appended };
        }

        let count = self.append(page.items);
        self.page_cursor = self.page_cursor.saturating_add(1);
        debug!(
            count,
            next_page = self.page_cursor,
            total = self.total_price,
            "appended purchase page"
        );
        FetchOutcome::Appended { count }
    }

    fn append(&mut self, batch: Vec<PurchaseRecord>) -> usize {
        self.total_price = self.total_price.saturating_add(batch_total(&batch));
        let count = batch.len();
        self.items.extend(batch);
        count
    }
}

/// Run one full fetch cycle against `source`.
pub async fn fetch_next_page<S: DataSource>(
    state: &mut PaginationState,
    source: &S,
    config: &PaginationConfig,
) -> FetchOutcome {
    let Some(page) = state.begin_fetch() else {
        return FetchOutcome::Skipped;
    };
    let result = source.fetch_page(page).await;
    state.finish_fetch(result, config)
}
