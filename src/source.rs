use crate::error::DataSourceError;
use crate::record::PurchaseRecord;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;

/// One batch of records. `is_end` marks that no further pages exist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "datas")]
    pub items: Vec<PurchaseRecord>,
    #[serde(rename = "isEnd")]
    pub is_end: bool,
}

impl Page {
    pub fn end() -> Self {
        Self {
            items: Vec::new(),
            is_end: true,
        }
    }
}

/// Anything that can hand out purchase records one page at a time.
///
/// Implementations must answer the same page number with the same batch for
/// the lifetime of the list, and must eventually report `is_end`.
pub trait DataSource: 'static {
    /// Fetch page `page`, counting from 1.
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<Page, DataSourceError>>;
}

const CATALOG: &[&str] = &[
    "Wireless Keyboard",
    "USB-C Hub",
    "Noise Cancelling Headphones",
    "Mechanical Pencil Set",
    "Standing Desk Mat",
    "27in Monitor",
    "Ergonomic Mouse",
    "Laptop Sleeve",
    "Webcam",
    "Desk Lamp",
];

/// 2024-01-01T00:00:00Z
const GENERATED_EPOCH_SECS: i64 = 1_704_067_200;

/// In-memory data source slicing a fixed record set into pages.
///
/// Cheap to clone: the records are shared.
#[derive(Debug, Clone)]
pub struct MockSource {
    records: Arc<[PurchaseRecord]>,
    page_size: usize,
    failing_pages: Rc<RefCell<BTreeSet<u32>>>,
}

impl MockSource {
    pub fn from_records(records: Vec<PurchaseRecord>, page_size: usize) -> Self {
        Self {
            records: records.into(),
            page_size: page_size.max(1),
            failing_pages: Rc::default(),
        }
    }

    /// Parse a JSON array of records (`productId`, `productName`, `price`, `boughtDate`).
    pub fn from_json(json: &str, page_size: usize) -> Result<Self, DataSourceError> {
        let records: Vec<PurchaseRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records, page_size))
    }

    /// Deterministic catalogue of `count` purchases, one day apart from 2024-01-01.
    pub fn generated(count: usize, page_size: usize) -> Self {
        let epoch = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(GENERATED_EPOCH_SECS);
        let records = (0..count)
            .map(|i| {
                let name = CATALOG[i % CATALOG.len()];
                PurchaseRecord {
                    product_id: format!("P{:05}", i + 1),
                    product_name: name.to_string(),
                    price: ((i as u64 * 37) % 50 + 1) * 100,
                    bought_date: epoch
                        + TimeDelta::days(i as i64)
                        + TimeDelta::hours((i as i64 * 7) % 24),
                }
            })
            .collect();
        Self::from_records(records, page_size)
    }

    /// Make each listed page fail once with [`DataSourceError::Unavailable`].
    pub fn with_failing_pages(self, pages: impl IntoIterator<Item = u32>) -> Self {
        self.failing_pages.borrow_mut().extend(pages);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn page_slice(&self, page: u32) -> &[PurchaseRecord] {
        let start = (page as usize - 1).saturating_mul(self.page_size);
        if start >= self.records.len() {
            return &[];
        }
        let end = start.saturating_add(self.page_size).min(self.records.len());
        &self.records[start..end]
    }
}

impl DataSource for MockSource {
    async fn fetch_page(&self, page: u32) -> Result<Page, DataSourceError> {
        if page == 0 {
            return Err(DataSourceError::InvalidPage { page });
        }
        if self.failing_pages.borrow_mut().remove(&page) {
            return Err(DataSourceError::Unavailable {
                page,
                reason: "simulated outage".to_string(),
            });
        }

        let items = self.page_slice(page);
        if items.is_empty() {
            return Ok(Page::end());
        }
        Ok(Page {
            items: items.to_vec(),
            is_end: false,
        })
    }
}
