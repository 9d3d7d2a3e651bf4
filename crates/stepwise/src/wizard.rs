//! The model wizard state machine.
//!
//! [`ModelWizard`] walks a sequence of [`WizardStep`]s. At build time the
//! step tree is flattened depth-first (each step followed by its dependent
//! steps), hidden steps are filtered out, and the first visible step is
//! entered. From then on the wizard only ever points at a visible step.
//!
//! Completing the last step finishes every model that a visible step used,
//! skips every model used only by hidden steps, and disposes all steps and
//! then all models. Cancelling disposes without finishing or skipping.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use stepwise::{HookResult, ModelHandle, ModelWizardBuilder, StepBase, WizardModel, WizardStep};
//! use stepwise_core::Property;
//!
//! #[derive(Default)]
//! struct Greeting {
//!     name: Property<String>,
//!     saved: Property<bool>,
//! }
//!
//! impl WizardModel for Greeting {
//!     fn handle_finished(&self) -> HookResult {
//!         self.saved.set(true);
//!         Ok(())
//!     }
//! }
//!
//! struct NameStep(StepBase<Greeting>);
//!
//! impl WizardStep for NameStep {
//!     fn title(&self) -> &str {
//!         self.0.title()
//!     }
//!
//!     fn model(&self) -> ModelHandle {
//!         self.0.handle()
//!     }
//!
//!     fn on_proceeding(&mut self) -> HookResult {
//!         self.0.model().name.set("Ada".to_string());
//!         Ok(())
//!     }
//! }
//!
//! let model = Arc::new(Greeting::default());
//! let mut wizard = ModelWizardBuilder::new()
//!     .add_step(NameStep(StepBase::new(model.clone(), "Name")))
//!     .build()
//!     .unwrap();
//!
//! assert!(wizard.on_last_step());
//! assert!(wizard.go_forward().unwrap());
//! assert!(wizard.is_finished());
//! assert_eq!(model.name.get(), "Ada");
//! assert!(model.saved.get());
//! ```

use std::fmt;
use std::sync::Arc;

use stepwise_core::logging::{span_names, targets};
use stepwise_core::{
    ImmediateInvokeStrategy, InvokeStrategy, PerfSpan, Property, Signal, Subscription,
    ThreadAffinity,
};

use crate::config::{EnterPolicy, WizardConfig};
use crate::error::{HookError, HookResult, Result, StepPhase, WizardError};
use crate::facade::{FacadeRequest, RequestQueue, WizardFacade};
use crate::listener::{ListenerId, WizardListener, WizardResult};
use crate::model::{ModelHandle, ModelRegistry, ModelState};
use crate::navigation::{NavigationInputs, NavigationProperties};
use crate::step::{BoxedStep, WizardStep};

/// Where a wizard is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardState {
    /// Navigation is possible.
    Running,
    /// The last step was completed and the models were finished.
    Completed,
    /// The wizard was cancelled.
    Cancelled,
    /// The wizard was disposed before it finished.
    Disposed,
}

struct StepEntry {
    step: BoxedStep,
    visible: bool,
    entered: bool,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ModelWizard`].
///
/// Slots connected through the `on_*` methods are attached before the first
/// step is shown, so they also observe the first step's title, index and
/// focus request.
#[derive(Default)]
pub struct ModelWizardBuilder {
    steps: Vec<BoxedStep>,
    config: WizardConfig,
    invoke_strategy: Option<Arc<dyn InvokeStrategy>>,
    current_step_changed: Signal<usize>,
    focus_requested: Signal<String>,
    title_changed: Signal<String>,
}

impl ModelWizardBuilder {
    /// Create an empty builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from top-level steps.
    pub fn from_steps<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = BoxedStep>,
    {
        Self {
            steps: steps.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Append a top-level step.
    pub fn add_step(self, step: impl WizardStep + 'static) -> Self {
        self.add_boxed_step(Box::new(step))
    }

    /// Append an already boxed top-level step.
    pub fn add_boxed_step(mut self, step: BoxedStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: WizardConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the name used in log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the `on_entering` re-entry policy.
    pub fn enter_policy(mut self, policy: EnterPolicy) -> Self {
        self.config.enter_policy = policy;
        self
    }

    /// Enable or disable thread affinity checks.
    pub fn check_thread_affinity(mut self, check: bool) -> Self {
        self.config.check_thread_affinity = check;
        self
    }

    /// Set the strategy used to refresh navigation properties.
    ///
    /// Defaults to [`ImmediateInvokeStrategy`].
    pub fn with_invoke_strategy(mut self, strategy: Arc<dyn InvokeStrategy>) -> Self {
        self.invoke_strategy = Some(strategy);
        self
    }

    /// Connect a slot to [`ModelWizard::current_step_changed`].
    pub fn on_current_step_changed<F>(self, slot: F) -> Self
    where
        F: Fn(&usize) + Send + Sync + 'static,
    {
        self.current_step_changed.connect(slot);
        self
    }

    /// Connect a slot to [`ModelWizard::focus_requested`].
    pub fn on_focus_requested<F>(self, slot: F) -> Self
    where
        F: Fn(&String) + Send + Sync + 'static,
    {
        self.focus_requested.connect(slot);
        self
    }

    /// Connect a slot to [`ModelWizard::title_changed`].
    pub fn on_title_changed<F>(self, slot: F) -> Self
    where
        F: Fn(&String) + Send + Sync + 'static,
    {
        self.title_changed.connect(slot);
        self
    }

    /// Flatten the steps, decide visibility and enter the first visible step.
    ///
    /// # Errors
    ///
    /// - [`WizardError::NoVisibleSteps`] if every step is hidden.
    /// - [`WizardError::StepTransition`] if the first step fails to enter.
    ///
    /// All steps and models are disposed on failure.
    pub fn build(self) -> Result<ModelWizard> {
        let _perf = PerfSpan::new(span_names::WIZARD_BUILD);
        let Self {
            steps,
            config,
            invoke_strategy,
            current_step_changed,
            focus_requested,
            title_changed,
        } = self;

        let mut flattened = Vec::with_capacity(steps.len());
        for step in steps {
            flatten_into(step, &mut flattened);
        }

        let navigation = NavigationProperties::new();
        let requests = RequestQueue::default();
        let facade = WizardFacade::new(Arc::clone(&requests), Arc::clone(&navigation));
        for step in &mut flattened {
            step.on_wizard_starting(&facade);
        }

        let mut models = ModelRegistry::new();
        let steps: Vec<StepEntry> = flattened
            .into_iter()
            .map(|step| {
                let visible = step.should_show();
                models.register(&step.model(), visible);
                StepEntry {
                    step,
                    visible,
                    entered: false,
                }
            })
            .collect();
        let visible: Vec<usize> = steps
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.visible)
            .map(|(index, _)| index)
            .collect();

        tracing::info!(
            target: targets::WIZARD,
            wizard = %config.name,
            steps = steps.len(),
            visible = visible.len(),
            models = models.len(),
            "building wizard"
        );

        let invoke_strategy: Arc<dyn InvokeStrategy> = match invoke_strategy {
            Some(strategy) => strategy,
            None => Arc::new(ImmediateInvokeStrategy),
        };

        let mut wizard = ModelWizard {
            affinity: ThreadAffinity::current(),
            config,
            steps,
            visible,
            position: 0,
            state: WizardState::Running,
            disposed: false,
            models,
            navigation,
            invoke_strategy,
            forward_watch: Subscription::empty(),
            requests,
            facade,
            title: Property::new(String::new()),
            finished: Signal::new(),
            advance_error: Signal::new(),
            current_step_changed,
            focus_requested,
            title_changed,
        };

        let Some(first) = wizard.visible.first().copied() else {
            tracing::warn!(target: targets::WIZARD, wizard = %wizard.config.name, "no visible steps");
            wizard.dispose();
            return Err(WizardError::NoVisibleSteps);
        };

        if let Err(source) = wizard.enter(first) {
            let error = wizard.transition_error(first, StepPhase::Entering, source);
            wizard.dispose();
            return Err(error);
        }

        wizard.show_current();
        Ok(wizard)
    }
}

impl fmt::Debug for ModelWizardBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelWizardBuilder")
            .field("steps", &self.steps.len())
            .field("config", &self.config)
            .field("custom_invoke_strategy", &self.invoke_strategy.is_some())
            .field("focus_slots", &self.focus_requested.connection_count())
            .finish()
    }
}

/// Depth-first pre-order expansion of a step and its dependents.
fn flatten_into(mut step: BoxedStep, out: &mut Vec<BoxedStep>) {
    let dependents = step.create_dependent_steps();
    out.push(step);
    for dependent in dependents {
        flatten_into(dependent, out);
    }
}

// ============================================================================
// Wizard
// ============================================================================

/// A wizard that drives a sequence of model-backed steps.
pub struct ModelWizard {
    config: WizardConfig,
    affinity: ThreadAffinity,
    steps: Vec<StepEntry>,
    /// Indices into `steps` of the visible steps, in order.
    visible: Vec<usize>,
    /// Index into `visible`.
    position: usize,
    state: WizardState,
    disposed: bool,
    models: ModelRegistry,
    navigation: Arc<NavigationProperties>,
    invoke_strategy: Arc<dyn InvokeStrategy>,
    forward_watch: Subscription,
    requests: RequestQueue,
    facade: WizardFacade,
    title: Property<String>,

    // Signals
    /// Signal emitted once when the wizard completes or is cancelled.
    pub finished: Signal<WizardResult>,
    /// Signal emitted when a step hook aborts a transition.
    pub advance_error: Signal<WizardError>,
    /// Signal emitted with the flattened index of each newly shown step.
    pub current_step_changed: Signal<usize>,
    /// Signal emitted with the focus target of a newly shown step.
    pub focus_requested: Signal<String>,
    /// Signal emitted when the current title changes.
    pub title_changed: Signal<String>,
}

impl ModelWizard {
    /// Create a builder.
    pub fn builder() -> ModelWizardBuilder {
        ModelWizardBuilder::new()
    }

    // Queries
    // =========================================================================

    /// The configuration the wizard was built with.
    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// The current lifecycle state.
    pub fn state(&self) -> WizardState {
        self.state
    }

    fn is_running(&self) -> bool {
        self.state == WizardState::Running
    }

    /// Whether the wizard completed or was cancelled.
    pub fn is_finished(&self) -> bool {
        matches!(self.state, WizardState::Completed | WizardState::Cancelled)
    }

    /// Whether steps and models have been released.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether `go_forward` would currently advance.
    pub fn can_go_forward(&self) -> bool {
        self.is_running() && self.current_entry().step.can_go_forward().get()
    }

    /// Whether `go_back` would currently move back.
    pub fn can_go_back(&self) -> bool {
        self.is_running() && self.position > 0 && self.current_entry().step.can_go_back()
    }

    /// Whether the current step is the first visible step.
    pub fn on_first_step(&self) -> bool {
        self.is_running() && self.position == 0
    }

    /// Whether the current step is the last visible step.
    pub fn on_last_step(&self) -> bool {
        self.is_running() && self.position + 1 == self.visible.len()
    }

    fn current_entry(&self) -> &StepEntry {
        &self.steps[self.current_index()]
    }

    /// The current step, until the wizard is disposed.
    pub fn current_step(&self) -> Option<&dyn WizardStep> {
        if self.disposed {
            return None;
        }
        Some(self.current_entry().step.as_ref())
    }

    /// Title of the current step.
    pub fn title(&self) -> String {
        self.title.get()
    }

    /// Index of the current step in the flattened sequence.
    pub fn current_index(&self) -> usize {
        self.visible[self.position]
    }

    /// Index of the current step among the visible steps.
    pub fn current_position(&self) -> usize {
        self.position
    }

    /// Number of flattened steps, hidden ones included.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Number of visible steps.
    pub fn visible_step_count(&self) -> usize {
        self.visible.len()
    }

    /// Titles of all flattened steps in order.
    pub fn step_titles(&self) -> Vec<&str> {
        self.steps.iter().map(|entry| entry.step.title()).collect()
    }

    /// Titles of the visible steps in order.
    pub fn visible_step_titles(&self) -> Vec<&str> {
        self.visible
            .iter()
            .map(|&index| self.steps[index].step.title())
            .collect()
    }

    /// Number of distinct models.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// How `model` was told the wizard ended, or `None` if no step uses it.
    pub fn model_state(&self, model: &ModelHandle) -> Option<ModelState> {
        self.models.state_of(model)
    }

    /// Observable navigation booleans.
    pub fn navigation(&self) -> &Arc<NavigationProperties> {
        &self.navigation
    }

    /// A facade for queuing navigation requests.
    pub fn facade(&self) -> WizardFacade {
        self.facade.clone()
    }

    // Listeners
    // =========================================================================

    /// Register a listener for the wizard outcome and advance errors.
    pub fn add_result_listener(&self, listener: Arc<dyn WizardListener>) -> ListenerId {
        let on_finished = Arc::clone(&listener);
        let finished = self
            .finished
            .connect(move |result| on_finished.on_wizard_finished(result));
        let advance_error = self
            .advance_error
            .connect(move |error| listener.on_wizard_advance_error(error));
        ListenerId {
            finished,
            advance_error,
        }
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn remove_result_listener(&self, id: ListenerId) -> bool {
        let removed_finished = self.finished.disconnect(id.finished);
        let removed_error = self.advance_error.disconnect(id.advance_error);
        removed_finished || removed_error
    }

    // Navigation
    // =========================================================================

    fn ensure_running(&self, operation: &'static str) -> Result<()> {
        if self.config.check_thread_affinity {
            self.affinity.assert_same_thread(operation);
        }
        match self.state {
            WizardState::Running => Ok(()),
            WizardState::Completed | WizardState::Cancelled => {
                Err(WizardError::AlreadyFinished { operation })
            }
            WizardState::Disposed => Err(WizardError::Disposed { operation }),
        }
    }

    /// Advance to the next visible step, or finish on the last one.
    ///
    /// Returns `Ok(false)` without side effects when the current step does
    /// not allow forward navigation.
    ///
    /// # Errors
    ///
    /// - [`WizardError::AlreadyFinished`] after completion or cancellation.
    /// - [`WizardError::StepTransition`] if `on_proceeding` or the next
    ///   step's `on_entering` fails. The wizard stays on the current step.
    /// - [`WizardError::ModelFinish`] if a model fails to finish. The wizard
    ///   is finished regardless.
    pub fn go_forward(&mut self) -> Result<bool> {
        self.ensure_running("go forward")?;

        let current = self.current_index();
        if !self.steps[current].step.can_go_forward().get() {
            tracing::debug!(target: targets::NAVIGATION, step = current, "forward navigation blocked");
            return Ok(false);
        }

        if let Err(source) = self.steps[current].step.on_proceeding() {
            return Err(self.transition_error(current, StepPhase::Proceeding, source));
        }

        let Some(next) = self.visible.get(self.position + 1).copied() else {
            return self.complete();
        };

        if let Err(source) = self.enter(next) {
            return Err(self.transition_error(next, StepPhase::Entering, source));
        }

        tracing::debug!(target: targets::NAVIGATION, from = current, to = next, "went forward");
        self.position += 1;
        self.show_current();
        Ok(true)
    }

    /// Move back to the previous visible step.
    ///
    /// Returns `Ok(false)` without side effects when the current step does
    /// not allow backward navigation.
    ///
    /// # Errors
    ///
    /// - [`WizardError::AlreadyFinished`] after completion or cancellation.
    /// - [`WizardError::NoPreviousStep`] on the first visible step.
    /// - [`WizardError::StepTransition`] if the previous step fails to enter.
    pub fn go_back(&mut self) -> Result<bool> {
        self.ensure_running("go back")?;

        let current = self.current_index();
        if !self.steps[current].step.can_go_back() {
            tracing::debug!(target: targets::NAVIGATION, step = current, "backward navigation blocked");
            return Ok(false);
        }

        let Some(previous_position) = self.position.checked_sub(1) else {
            return Err(WizardError::NoPreviousStep);
        };
        let previous = self.visible[previous_position];

        if let Err(source) = self.enter(previous) {
            return Err(self.transition_error(previous, StepPhase::Entering, source));
        }

        tracing::debug!(target: targets::NAVIGATION, from = current, to = previous, "went back");
        self.position = previous_position;
        self.show_current();
        Ok(true)
    }

    /// Cancel the wizard without finishing or skipping any model.
    ///
    /// # Errors
    ///
    /// [`WizardError::AlreadyFinished`] if the wizard already ended.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_running("cancel")?;

        tracing::info!(target: targets::WIZARD, wizard = %self.config.name, "wizard cancelled");
        self.state = WizardState::Cancelled;
        self.release();
        self.finished.emit(WizardResult::cancelled());
        Ok(())
    }

    /// Release every step and model. Safe to call more than once.
    ///
    /// A running wizard moves to [`WizardState::Disposed`] and rejects
    /// further navigation. Listeners are not notified.
    pub fn dispose(&mut self) {
        if self.config.check_thread_affinity {
            self.affinity.assert_same_thread("dispose");
        }
        if self.is_running() {
            self.state = WizardState::Disposed;
        }
        self.release();
    }

    /// Recompute the navigation properties now.
    pub fn update_navigation_properties(&self) {
        self.navigation.refresh();
    }

    /// Run the requests queued through [`WizardFacade`], in order.
    ///
    /// Stops at the first failing request; later requests stay queued.
    /// Returns the number of requests taken from the queue.
    pub fn process_pending_requests(&mut self) -> Result<usize> {
        let mut processed = 0;
        loop {
            let next = self.requests.lock().pop_front();
            let Some(request) = next else {
                break;
            };
            processed += 1;

            tracing::trace!(target: targets::NAVIGATION, ?request, "processing facade request");
            match request {
                FacadeRequest::GoForward => {
                    self.go_forward()?;
                }
                FacadeRequest::GoBack => {
                    self.go_back()?;
                }
                FacadeRequest::Cancel => self.cancel()?,
                FacadeRequest::UpdateNavigationProperties => self.update_navigation_properties(),
            }
        }
        Ok(processed)
    }

    // Internals
    // =========================================================================

    /// Run `on_entering` on the step at `index` according to the enter policy.
    fn enter(&mut self, index: usize) -> HookResult {
        let reenters = self.config.reenters();
        let entry = &mut self.steps[index];
        if entry.entered && !reenters {
            tracing::trace!(target: targets::NAVIGATION, step = index, "step already entered");
            return Ok(());
        }
        entry.step.on_entering()?;
        entry.entered = true;
        Ok(())
    }

    /// Publish the current step: navigation, title, index and focus.
    fn show_current(&mut self) {
        let index = self.current_index();
        let step = &self.steps[index].step;
        let condition = step.can_go_forward();
        let step_can_go_back = step.can_go_back();
        let title = step.title().to_string();
        let focus = step.preferred_focus();

        self.forward_watch = self.navigation.watch(&condition, &self.invoke_strategy);
        self.navigation.set_inputs(NavigationInputs {
            running: true,
            finished: false,
            step_can_go_forward: condition,
            step_can_go_back,
            has_previous: self.position > 0,
            has_next: self.position + 1 < self.visible.len(),
        });
        self.navigation.refresh();

        tracing::debug!(target: targets::NAVIGATION, step = index, title = %title, "showing step");
        if self.title.set(title.clone()) {
            self.title_changed.emit(title);
        }
        self.current_step_changed.emit(index);
        if let Some(target) = focus {
            self.focus_requested.emit(target);
        }
    }

    fn transition_error(&self, index: usize, phase: StepPhase, source: HookError) -> WizardError {
        let error =
            WizardError::step_transition(self.steps[index].step.title(), index, phase, source);
        tracing::warn!(target: targets::NAVIGATION, step = index, %phase, error = %error, "step transition failed");
        self.advance_error.emit(error.clone());
        error
    }

    /// Finish the wizard after the last step was left.
    fn complete(&mut self) -> Result<bool> {
        let _perf = PerfSpan::new(span_names::WIZARD_FINISH);
        self.state = WizardState::Completed;

        let failure = self.models.finish_visible();
        self.models.skip_hidden();
        self.release();

        tracing::info!(
            target: targets::WIZARD,
            wizard = %self.config.name,
            failed = failure.is_some(),
            "wizard finished"
        );
        self.finished.emit(WizardResult::finished());

        match failure {
            Some(error) => Err(error),
            None => Ok(true),
        }
    }

    /// Dispose steps then models, once.
    fn release(&mut self) {
        if self.disposed {
            return;
        }
        let _perf = PerfSpan::new(span_names::WIZARD_DISPOSE);
        self.disposed = true;
        self.forward_watch = Subscription::empty();

        for entry in &mut self.steps {
            entry.step.dispose();
        }
        self.models.dispose_all();
        self.requests.lock().clear();

        self.navigation.set_inputs(NavigationInputs::stopped(self.is_finished()));
        self.navigation.refresh();
        tracing::debug!(
            target: targets::WIZARD,
            wizard = %self.config.name,
            steps = self.steps.len(),
            models = self.models.len(),
            "released wizard resources"
        );
    }
}

impl Drop for ModelWizard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ModelWizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelWizard")
            .field("name", &self.config.name)
            .field("state", &self.state)
            .field("current_index", &self.visible.get(self.position))
            .field("step_count", &self.steps.len())
            .field("visible_step_count", &self.visible.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}
