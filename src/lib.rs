pub mod config;
pub mod error;
pub mod pagination;
pub mod record;
pub mod source;
pub mod trigger;
pub mod view;

use dioxus::prelude::*;
#[cfg(target_arch = "wasm32")]
use dioxus_web::WebEventExt;
use std::rc::Rc;
use tracing::debug;
#[cfg(target_arch = "wasm32")]
use tracing::warn;

pub use config::{Labels, ListConfig};
pub use error::DataSourceError;
pub use pagination::{fetch_next_page, FetchGuard, FetchOutcome, PaginationConfig, PaginationState, TerminalBatch};
pub use record::PurchaseRecord;
pub use source::{DataSource, MockSource, Page};
#[cfg(target_arch = "wasm32")]
pub use trigger::IntersectionTrigger;
pub use trigger::{should_fire, TriggerOptions, VisibilityTrigger};
pub use view::{format_date, format_price, ListView, RowView};

pub struct PurchaseListProps<S: DataSource> {
    pub source: S,
    pub config: ListConfig,
}

/// Infinite-scroll purchase list with a running total.
///
/// Pages are pulled from `source` whenever the sentinel after the last row
/// becomes visible, until the source reports the end.
#[allow(non_snake_case)]
pub fn PurchaseList<S: DataSource>(props: PurchaseListProps<S>) -> Element {
    let PurchaseListProps { source, config } = props;

    // 1. Hold pagination state in a signal; rendering reads it through ListView.
    // 2. Derive the fetch guard so the trigger only re-arms when it flips.
    // 3. Re-arm the sentinel observer on every guard change and on mount.
    // 4. Fetch the next page whenever the observer reports the sentinel visible.
    // 5. Cancel the in-flight fetch and release the observer on unmount.

    // Props are only read on first render; later renders reuse these.
    let source = use_hook(|| Rc::new(source));
    let config = use_hook(|| Rc::new(config));

    let mut state = use_signal(PaginationState::new);
    let mut in_flight = use_signal::<Option<Task>>(|| None);
    #[allow(unused_mut)]
    let mut sentinel_visible = use_signal(|| false);
    #[cfg(target_arch = "wasm32")]
    let mut sentinel_el = use_signal::<Option<web_sys::Element>>(|| None);

    let guard = use_memo(move || state.read().guard());

    // `retry == true` clears a recorded failure before starting.
    let fetch_next = use_callback({
        let source = source.clone();
        let config = config.clone();
        move |retry: bool| {
            {
                let current = state.peek();
                if current.is_loading() || (!retry && !current.can_fetch()) {
                    return;
                }
            }
            let started = if retry {
                state.write().retry()
            } else {
                state.write().begin_fetch()
            };
            let Some(page) = started else {
                return;
            };

            let source = source.clone();
            let config = config.clone();
            let task = spawn(async move {
                let result = source.fetch_page(page).await;
                let outcome = state.write().finish_fetch(result, &config.pagination);
                debug!(page, ?outcome, "purchase page settled");
                in_flight.set(None);
            });
            in_flight.set(Some(task));
        }
    });

    // Only visibility reports start fetches; the guard is peeked so a settling
    // fetch does not re-fire before the re-armed observer has reported.
    use_effect(move || {
        let visible = sentinel_visible();
        if trigger::should_fire(visible, state.peek().guard()) {
            fetch_next.call(false);
        }
    });

    // Without an observer the first page is requested once on mount.
    #[cfg(not(target_arch = "wasm32"))]
    use_effect(move || fetch_next.call(false));

    #[cfg(target_arch = "wasm32")]
    {
        let mut armed = use_signal::<Option<IntersectionTrigger>>(|| None);

        use_effect({
            let options = config.trigger.clone();
            move || {
                let _ = guard();
                let target = sentinel_el.read().clone();
                let next = match IntersectionTrigger::new(&options, move |visible| {
                    sentinel_visible.set(visible);
                }) {
                    Ok(observer) => Some(observer),
                    Err(e) => {
                        warn!(error = ?e, "failed to create sentinel observer");
                        None
                    }
                };
                armed.with_mut(|slot| trigger::rearm(slot, next, target.as_ref()));
            }
        });

        use_drop(move || {
            if let Some(mut observer) = armed.take() {
                observer.release();
            }
        });
    }

    use_drop(move || {
        if let Some(task) = in_flight.take() {
            debug!("cancelling in-flight purchase fetch");
            task.cancel();
        }
    });

    let labels = &config.labels;
    let view = ListView::from_state(&state.read(), labels);
    let show_load_more = cfg!(not(target_arch = "wasm32")) && guard().allows_fetch();
    let show_error = view.error_text.is_some();
    let error_text = view.error_text.clone().unwrap_or_default();

    rsx! {
        div {
            class: "purchase-list",

            h1 { class: "purchase-list-title", "{labels.title}" }

            ul {
                class: "purchase-list-rows",
                for row in view.rows.iter() {
                    li {
                        key: "{row.key}",
                        class: "purchase-row",
                        span { "{row.name} {row.price_text}" }
                        span { class: "purchase-row-date", "{row.date_text}" }
                    }
                }
            }

            div {
                class: "purchase-list-total",
                strong { "{labels.total}" }
                " {view.total_text}"
            }

            if view.show_loading {
                div { class: "purchase-list-loading", "{labels.loading}" }
            }

            if view.show_end {
                div { class: "purchase-list-end", "{labels.end_of_data}" }
            }

            if show_error {
                div {
                    class: "purchase-list-error",
                    span { "{error_text}" }
                    button {
                        class: "purchase-list-retry",
                        onclick: move |_| fetch_next.call(true),
                        "{labels.retry}"
                    }
                }
            }

            // Sentinel observed by the visibility trigger; always rendered.
            // Without an observer it carries the load-more button instead.
            div {
                class: "purchase-list-sentinel",
                onmounted: move |_event: Event<MountedData>| {
                    #[cfg(target_arch = "wasm32")]
                    {
                        sentinel_el.set(Some(_event.as_web_event()));
                    }
                },
                if show_load_more {
                    button {
                        class: "purchase-list-more",
                        onclick: move |_| fetch_next.call(false),
                        "{labels.load_more}"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dioxus::dioxus_core::{NoOpMutations, ScopeId, VirtualDom};
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    /// Sets the shared flag when dropped, i.e. when a pending fetch is abandoned.
    struct DropFlag(Rc<Cell<bool>>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    #[derive(Clone)]
    struct RecordingSource {
        inner: MockSource,
        calls: Rc<RefCell<Vec<u32>>>,
        hang: bool,
        abandoned: Rc<Cell<bool>>,
    }

    impl RecordingSource {
        fn new(hang: bool) -> Self {
            Self {
                inner: MockSource::generated(25, 10),
                calls: Rc::default(),
                hang,
                abandoned: Rc::default(),
            }
        }

        fn calls(&self) -> Vec<u32> {
            self.calls.borrow().clone()
        }
    }

    impl PartialEq for RecordingSource {
        fn eq(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.calls, &other.calls)
        }
    }

    impl DataSource for RecordingSource {
        async fn fetch_page(&self, page: u32) -> Result<Page, DataSourceError> {
            self.calls.borrow_mut().push(page);
            if self.hang {
                let _flag = DropFlag(Rc::clone(&self.abandoned));
                std::future::pending::<()>().await;
            }
            self.inner.fetch_page(page).await
        }
    }

    #[component]
    fn Host(source: RecordingSource) -> Element {
        PurchaseList(PurchaseListProps {
            source,
            config: ListConfig::default(),
        })
    }

    #[derive(Clone)]
    struct HarnessProps {
        source: RecordingSource,
        mounted: Rc<Cell<bool>>,
    }

    #[allow(non_snake_case)]
    fn Harness(props: HarnessProps) -> Element {
        rsx! {
            if props.mounted.get() {
                Host { source: props.source.clone() }
            }
        }
    }

    fn mount(source: &RecordingSource) -> (VirtualDom, Rc<Cell<bool>>) {
        let mounted = Rc::new(Cell::new(true));
        let mut dom = VirtualDom::new_with_props(
            Harness,
            HarnessProps {
                source: source.clone(),
                mounted: Rc::clone(&mounted),
            },
        );
        dom.rebuild_in_place();
        (dom, mounted)
    }

    async fn settle(dom: &mut VirtualDom) {
        for _ in 0..10 {
            let work = tokio::time::timeout(Duration::from_millis(20), dom.wait_for_work()).await;
            if work.is_err() {
                break;
            }
            dom.render_immediate(&mut NoOpMutations);
        }
    }

    #[tokio::test]
    async fn mount_requests_first_page_once() {
        let source = RecordingSource::new(false);
        let (mut dom, _mounted) = mount(&source);

        settle(&mut dom).await;
        settle(&mut dom).await;

        assert_eq!(source.calls(), [1]);
    }

    #[tokio::test]
    async fn no_second_request_while_loading() {
        let source = RecordingSource::new(true);
        let (mut dom, _mounted) = mount(&source);

        settle(&mut dom).await;
        dom.mark_dirty(ScopeId::APP);
        dom.render_immediate(&mut NoOpMutations);
        settle(&mut dom).await;

        assert_eq!(source.calls(), [1]);
        assert!(!source.abandoned.get());
    }

    #[tokio::test]
    async fn unmount_cancels_in_flight_fetch() {
        let source = RecordingSource::new(true);
        let (mut dom, mounted) = mount(&source);

        settle(&mut dom).await;
        assert_eq!(source.calls(), [1]);
        assert!(!source.abandoned.get());

        mounted.set(false);
        dom.mark_dirty(ScopeId::APP);
        dom.render_immediate(&mut NoOpMutations);
        settle(&mut dom).await;

        assert!(source.abandoned.get());
        assert_eq!(source.calls(), [1]);
    }
}
