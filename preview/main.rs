use dioxus::logger::tracing::Level;
use dioxus::prelude::*;
use dioxus_purchase_list::{ListConfig, MockSource, PurchaseList, PurchaseListProps};

const PAGE_SIZE: usize = 10;
const RECORD_COUNT: usize = 57;

fn main() {
    dioxus::logger::init(Level::DEBUG).expect("failed to init logger");
    dioxus::launch(App);
}

const PREVIEW_CSS: &str = r#"
    html, body {
        margin: 0;
        padding: 0;
        font-family: system-ui, "Apple SD Gothic Neo", "Noto Sans KR", sans-serif;
        background: #e5e7eb;
        color: #374151;
        line-height: 1.5;
    }
    .purchase-list {
        max-width: 42rem;
        margin: 20px auto;
        padding: 20px;
        background: #f3f4f6;
        border-radius: 8px;
        box-shadow: 0 10px 15px rgba(0, 0, 0, 0.1);
    }
    .purchase-list-title {
        text-align: center;
        margin: 0 0 20px;
        font-size: 24px;
        color: #1f2937;
    }
    .purchase-list-rows {
        list-style: none;
        padding: 0;
        margin: 0;
    }
    .purchase-row {
        display: flex;
        justify-content: space-between;
        padding: 12px;
        border-bottom: 1px solid #d1d5db;
    }
    .purchase-row-date {
        font-style: italic;
    }
    .purchase-list-total {
        margin-top: 20px;
        text-align: right;
        font-size: 18px;
        font-weight: 700;
    }
    .purchase-list-loading,
    .purchase-list-end,
    .purchase-list-error {
        text-align: center;
        margin-top: 8px;
    }
    .purchase-list-loading {
        color: #3b82f6;
    }
    .purchase-list-end,
    .purchase-list-error {
        color: #ef4444;
    }
    .purchase-list-retry {
        margin-left: 8px;
    }
"#;

#[allow(non_snake_case)]
fn App() -> Element {
    // Page 3 fails once so the retry prompt can be exercised by scrolling.
    let source = MockSource::generated(RECORD_COUNT, PAGE_SIZE).with_failing_pages([3]);

    rsx! {
        style {
            "{PREVIEW_CSS}"
        }

        {
            PurchaseList(PurchaseListProps {
                source,
                config: ListConfig::default(),
            })
        }
    }
}
