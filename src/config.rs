use crate::pagination::PaginationConfig;
use crate::trigger::TriggerOptions;
use serde::{Deserialize, Serialize};

/// All tuneable settings for [`PurchaseList`](crate::PurchaseList).
///
/// Use [`Default::default()`] or deserialize a partial document; missing
/// fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub pagination: PaginationConfig,
    pub trigger: TriggerOptions,
    pub labels: Labels,
}

impl ListConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// User-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub title: String,
    pub total: String,
    pub loading: String,
    pub end_of_data: String,
    pub retry: String,
    /// Appended to every amount.
    pub currency_suffix: String,
    /// Only used where no observer is available (non-wasm targets).
    pub load_more: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            title: "상품 리스트".to_string(),
            total: "총 가격:".to_string(),
            loading: "로딩 중...".to_string(),
            end_of_data: "더 이상 불러올 데이터가 없습니다.".to_string(),
            retry: "다시 시도".to_string(),
            currency_suffix: "원".to_string(),
            load_more: "더 보기".to_string(),
        }
    }
}
