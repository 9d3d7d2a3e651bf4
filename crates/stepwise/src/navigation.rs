//! Observable navigation state.
//!
//! [`NavigationProperties`] caches the wizard's navigation booleans in
//! [`BoolValueProperty`] values a host can bind buttons to. The cache is
//! refreshed synchronously after every transition, and through the wizard's
//! [`InvokeStrategy`] when the current step's `can_go_forward` expression
//! changes. Several invalidations before a refresh runs collapse into one.
//!
//! Navigation decisions never read this cache; the wizard evaluates the
//! current step directly.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use stepwise_core::logging::targets;
use stepwise_core::{BoolValueProperty, InvokeStrategy, ObservableBool, Subscription};

/// Inputs the cached booleans are derived from.
#[derive(Debug, Clone)]
pub(crate) struct NavigationInputs {
    pub(crate) running: bool,
    pub(crate) finished: bool,
    pub(crate) step_can_go_forward: ObservableBool,
    pub(crate) step_can_go_back: bool,
    pub(crate) has_previous: bool,
    pub(crate) has_next: bool,
}

impl NavigationInputs {
    /// Inputs of a wizard that can no longer navigate.
    ///
    /// `finished` is false for a wizard that was disposed before it ended.
    pub(crate) fn stopped(finished: bool) -> Self {
        Self {
            running: false,
            finished,
            step_can_go_forward: ObservableBool::always_false(),
            step_can_go_back: false,
            has_previous: false,
            has_next: false,
        }
    }
}

/// Cached, observable navigation booleans of a wizard.
pub struct NavigationProperties {
    can_go_forward: Arc<BoolValueProperty>,
    can_go_back: Arc<BoolValueProperty>,
    on_first_step: Arc<BoolValueProperty>,
    on_last_step: Arc<BoolValueProperty>,
    finished: Arc<BoolValueProperty>,
    inputs: Mutex<NavigationInputs>,
    refresh_pending: AtomicBool,
    refresh_count: AtomicUsize,
}

impl NavigationProperties {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            can_go_forward: BoolValueProperty::shared(false),
            can_go_back: BoolValueProperty::shared(false),
            on_first_step: BoolValueProperty::shared(false),
            on_last_step: BoolValueProperty::shared(false),
            finished: BoolValueProperty::shared(false),
            inputs: Mutex::new(NavigationInputs::stopped(false)),
            refresh_pending: AtomicBool::new(false),
            refresh_count: AtomicUsize::new(0),
        })
    }

    /// Whether forward navigation is allowed.
    pub fn can_go_forward(&self) -> &Arc<BoolValueProperty> {
        &self.can_go_forward
    }

    /// Whether backward navigation is allowed.
    pub fn can_go_back(&self) -> &Arc<BoolValueProperty> {
        &self.can_go_back
    }

    /// Whether the current step is the first visible step.
    pub fn on_first_step(&self) -> &Arc<BoolValueProperty> {
        &self.on_first_step
    }

    /// Whether the current step is the last visible step.
    pub fn on_last_step(&self) -> &Arc<BoolValueProperty> {
        &self.on_last_step
    }

    /// Whether the wizard finished or was cancelled.
    pub fn finished(&self) -> &Arc<BoolValueProperty> {
        &self.finished
    }

    /// Whether an invalidation is waiting for its refresh to run.
    pub fn is_refresh_pending(&self) -> bool {
        self.refresh_pending.load(Ordering::Acquire)
    }

    /// Number of refreshes performed so far.
    pub fn refresh_count(&self) -> usize {
        self.refresh_count.load(Ordering::Relaxed)
    }

    /// Recompute every cached boolean from the current inputs.
    pub fn refresh(&self) {
        self.refresh_pending.store(false, Ordering::Release);
        self.refresh_count.fetch_add(1, Ordering::Relaxed);

        // Property setters emit, so the inputs lock is released first.
        let inputs = self.inputs.lock().clone();
        let running = inputs.running;

        self.can_go_forward
            .set(running && inputs.step_can_go_forward.get());
        self.can_go_back
            .set(running && inputs.has_previous && inputs.step_can_go_back);
        self.on_first_step.set(running && !inputs.has_previous);
        self.on_last_step.set(running && !inputs.has_next);
        self.finished.set(inputs.finished);

        tracing::trace!(
            target: targets::NAVIGATION,
            can_go_forward = self.can_go_forward.get(),
            can_go_back = self.can_go_back.get(),
            "refreshed navigation properties"
        );
    }

    pub(crate) fn set_inputs(&self, inputs: NavigationInputs) {
        *self.inputs.lock() = inputs;
    }

    /// Schedule a refresh through `strategy` unless one is already queued.
    pub(crate) fn invalidate(self: &Arc<Self>, strategy: &dyn InvokeStrategy) {
        if self.refresh_pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let weak = Arc::downgrade(self);
        strategy.invoke(Box::new(move || {
            if let Some(navigation) = weak.upgrade() {
                navigation.refresh();
            }
        }));
    }

    /// Watch `condition` and invalidate whenever it changes.
    pub(crate) fn watch(
        self: &Arc<Self>,
        condition: &ObservableBool,
        strategy: &Arc<dyn InvokeStrategy>,
    ) -> Subscription {
        let navigation: Weak<Self> = Arc::downgrade(self);
        let strategy = Arc::clone(strategy);
        condition.subscribe(move || {
            if let Some(navigation) = navigation.upgrade() {
                navigation.invalidate(strategy.as_ref());
            }
        })
    }
}

impl fmt::Debug for NavigationProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationProperties")
            .field("can_go_forward", &self.can_go_forward.get())
            .field("can_go_back", &self.can_go_back.get())
            .field("on_first_step", &self.on_first_step.get())
            .field("on_last_step", &self.on_last_step.get())
            .field("finished", &self.finished.get())
            .field("refresh_pending", &self.is_refresh_pending())
            .finish()
    }
}

static_assertions::assert_impl_all!(NavigationProperties: Send, Sync);
