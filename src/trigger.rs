use crate::pagination::FetchGuard;
use serde::{Deserialize, Serialize};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

#[cfg(target_arch = "wasm32")]
type IntersectionClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Observation settings. The root is always the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerOptions {
    /// Fraction of the sentinel that must be visible, `0.0..=1.0`.
    pub threshold: f64,
    /// CSS margin grown around the viewport before intersecting.
    pub root_margin: String,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            root_margin: "0px".to_string(),
        }
    }
}

impl TriggerOptions {
    pub fn clamped_threshold(&self) -> f64 {
        if self.threshold.is_nan() {
            return 1.0;
        }
        self.threshold.clamp(0.0, 1.0)
    }
}

/// Capability to watch one element for visibility.
pub trait VisibilityTrigger {
    type Target;

    fn observe(&mut self, target: &Self::Target);

    /// Stop observing. Safe to call more than once.
    fn release(&mut self);
}

/// Whether an intersection report counts as "sentinel visible".
pub fn entry_is_visible(is_intersecting: bool, ratio: f64, threshold: f64) -> bool {
    // Browsers report ratios like 0.99999 for fully visible targets.
    is_intersecting && ratio + 1e-3 >= threshold
}

/// Callback decision: only a visible sentinel with an open guard fetches.
pub fn should_fire(visible: bool, guard: FetchGuard) -> bool {
    visible && guard.allows_fetch()
}

/// Release whatever `slot` holds, then install `next` watching `target`.
///
/// Used to tear the trigger down and build a fresh one whenever the fetch
/// guard changes, so no stale observer keeps firing.
pub fn rearm<T: VisibilityTrigger>(slot: &mut Option<T>, next: Option<T>, target: Option<&T::Target>) {
    if let Some(mut old) = slot.take() {
        old.release();
    }
    let Some(mut next) = next else {
        return;
    };
    if let Some(target) = target {
        next.observe(target);
    }
    *slot = Some(next);
}

/// [`VisibilityTrigger`] backed by the browser's `IntersectionObserver`.
#[cfg(target_arch = "wasm32")]
pub struct IntersectionTrigger {
    observer: Option<IntersectionObserver>,
    callback: Option<IntersectionClosure>,
}

#[cfg(target_arch = "wasm32")]
impl IntersectionTrigger {
    /// `on_change` receives `true` when the first observed entry meets the threshold.
    pub fn new(options: &TriggerOptions, mut on_change: impl FnMut(bool) + 'static) -> Result<Self, JsValue> {
        let threshold = options.clamped_threshold();
        let callback = Closure::wrap(Box::new(move |entries: js_sys::Array, _observer: IntersectionObserver| {
            let visible = entries
                .get(0)
                .dyn_into::<IntersectionObserverEntry>()
                .map(|entry| entry_is_visible(entry.is_intersecting(), entry.intersection_ratio(), threshold))
                .unwrap_or(false);
            on_change(visible);
        }) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        init.set_root_margin(&options.root_margin);

        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        Ok(Self {
            observer: Some(observer),
            callback: Some(callback),
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl VisibilityTrigger for IntersectionTrigger {
    type Target = web_sys::Element;

    fn observe(&mut self, target: &web_sys::Element) {
        if let Some(observer) = &self.observer {
            observer.observe(target);
        }
    }

    fn release(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.callback.take();
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for IntersectionTrigger {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Journal {
        events: Vec<String>,
    }

    struct FakeTrigger {
        name: &'static str,
        journal: Rc<RefCell<Journal>>,
        released: bool,
    }

    impl FakeTrigger {
        fn new(name: &'static str, journal: &Rc<RefCell<Journal>>) -> Self {
            Self {
                name,
                journal: Rc::clone(journal),
                released: false,
            }
        }
    }

    impl VisibilityTrigger for FakeTrigger {
        type Target = &'static str;

        fn observe(&mut self, target: &&'static str) {
            self.journal
                .borrow_mut()
                .events
                .push(format!("{} observe {target}", self.name));
        }

        fn release(&mut self) {
            if self.released {
                return;
            }
            self.released = true;
            self.journal
                .borrow_mut()
                .events
                .push(format!("{} release", self.name));
        }
    }

    #[test]
    fn default_options_require_full_visibility() {
        let options = TriggerOptions::default();
        assert_eq!(options.threshold, 1.0);
        assert_eq!(options.root_margin, "0px");
    }

    #[test]
    fn threshold_is_clamped() {
        let mut options = TriggerOptions {
            threshold: 3.0,
            ..Default::default()
        };
        assert_eq!(options.clamped_threshold(), 1.0);
        options.threshold = -1.0;
        assert_eq!(options.clamped_threshold(), 0.0);
        options.threshold = f64::NAN;
        assert_eq!(options.clamped_threshold(), 1.0);
    }

    #[test]
    fn visibility_respects_threshold() {
        assert!(entry_is_visible(true, 1.0, 1.0));
        assert!(entry_is_visible(true, 0.9999, 1.0));
        assert!(!entry_is_visible(true, 0.5, 1.0));
        assert!(!entry_is_visible(false, 1.0, 1.0));
        assert!(entry_is_visible(true, 0.5, 0.5));
    }

    #[test]
    fn fires_only_with_open_guard() {
        let open = FetchGuard::default();
        assert!(should_fire(true, open));
        assert!(!should_fire(false, open));

        let loading = FetchGuard {
            loading: true,
            ..open
        };
        let exhausted = FetchGuard {
            exhausted: true,
            ..open
        };
        let failed = FetchGuard {
            failed: true,
            ..open
        };
        for guard in [loading, exhausted, failed] {
            assert!(!should_fire(true, guard));
        }
    }

    #[test]
    fn rearm_releases_before_observing() {
        let journal = Rc::new(RefCell::new(Journal::default()));
        let mut slot = None;

        rearm(&mut slot, Some(FakeTrigger::new("first", &journal)), Some(&"sentinel"));
        rearm(&mut slot, Some(FakeTrigger::new("second", &journal)), Some(&"sentinel"));

        assert_eq!(
            journal.borrow().events,
            [
                "first observe sentinel",
                "first release",
                "second observe sentinel",
            ]
        );
        assert_eq!(slot.as_ref().map(|t| t.name), Some("second"));
    }

    #[test]
    fn rearm_without_target_keeps_trigger_idle() {
        let journal = Rc::new(RefCell::new(Journal::default()));
        let mut slot = None;

        rearm(&mut slot, Some(FakeTrigger::new("idle", &journal)), None);
        assert!(journal.borrow().events.is_empty());
        assert!(slot.is_some());

        rearm::<FakeTrigger>(&mut slot, None, None);
        assert_eq!(journal.borrow().events, ["idle release"]);
        assert!(slot.is_none());
    }
}
