//! Wizard models and their lifecycle.
//!
//! A [`WizardModel`] holds the state a group of steps fills in. Several steps
//! may share one model; the wizard deduplicates models by pointer identity
//! and tells each distinct model exactly once how the wizard ended:
//!
//! - [`WizardModel::handle_finished`] if at least one of its steps was shown
//!   and the wizard completed.
//! - [`WizardModel::handle_skipped`] if every one of its steps was hidden.
//!
//! Cancelled wizards notify neither. Every model is disposed once, after all
//! steps have been disposed.
//!
//! Models are shared behind `Arc`, so their state is usually kept in
//! [`Property`](stepwise_core::Property) fields and mutated through `&self`.
//!
//! ```
//! use std::sync::Arc;
//! use stepwise::{HookResult, ModelHandle, WizardModel};
//! use stepwise_core::Property;
//!
//! #[derive(Default)]
//! struct PersonModel {
//!     name: Property<String>,
//! }
//!
//! impl WizardModel for PersonModel {
//!     fn handle_finished(&self) -> HookResult {
//!         println!("saving {}", self.name.get());
//!         Ok(())
//!     }
//! }
//!
//! let person = Arc::new(PersonModel::default());
//! let handle = ModelHandle::from(&person);
//! assert!(handle.ptr_eq(&ModelHandle::from(&person)));
//! ```

use std::fmt;
use std::sync::Arc;

use stepwise_core::logging::targets;

use crate::error::{HookResult, WizardError};

/// State gathered by one or more wizard steps.
pub trait WizardModel: Send + Sync + 'static {
    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once when the wizard completes and this model was reachable
    /// from at least one visible step.
    fn handle_finished(&self) -> HookResult;

    /// Called once on completion when every step using this model was hidden.
    fn handle_skipped(&self) {}

    /// Release resources. Called once at wizard teardown.
    fn dispose(&self) {}
}

/// Identity of a model, derived from its allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(usize);

/// A shared handle to a model.
///
/// Two handles refer to the same model when they point at the same
/// allocation, regardless of how many steps hold them.
#[derive(Clone)]
pub struct ModelHandle {
    model: Arc<dyn WizardModel>,
}

impl ModelHandle {
    /// Wrap a shared model.
    pub fn new<M: WizardModel>(model: Arc<M>) -> Self {
        Self { model }
    }

    /// Wrap an already type-erased model.
    pub fn from_dyn(model: Arc<dyn WizardModel>) -> Self {
        Self { model }
    }

    /// The identity used for deduplication.
    pub fn id(&self) -> ModelId {
        ModelId(Arc::as_ptr(&self.model) as *const () as usize)
    }

    /// Whether both handles refer to the same model.
    pub fn ptr_eq(&self, other: &ModelHandle) -> bool {
        self.id() == other.id()
    }

    /// The model's name.
    pub fn name(&self) -> &str {
        self.model.name()
    }

    pub(crate) fn model(&self) -> &dyn WizardModel {
        self.model.as_ref()
    }
}

impl<M: WizardModel> From<Arc<M>> for ModelHandle {
    fn from(model: Arc<M>) -> Self {
        Self::new(model)
    }
}

impl<M: WizardModel> From<&Arc<M>> for ModelHandle {
    fn from(model: &Arc<M>) -> Self {
        Self::new(Arc::clone(model))
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.name())
            .field("id", &self.id())
            .finish()
    }
}

/// How a model was told the wizard ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelState {
    /// The wizard has not completed yet, or was cancelled.
    #[default]
    Pending,
    /// `handle_finished` was called.
    Finished,
    /// `handle_skipped` was called.
    Skipped,
}

#[derive(Debug)]
struct ModelRecord {
    handle: ModelHandle,
    visible: bool,
    state: ModelState,
    disposed: bool,
}

/// Distinct models of a wizard in first-occurrence order.
#[derive(Debug, Default)]
pub(crate) struct ModelRegistry {
    records: Vec<ModelRecord>,
}

impl ModelRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record that a step using `handle` exists. A model is visible once any
    /// of its steps is visible.
    pub(crate) fn register(&mut self, handle: &ModelHandle, step_visible: bool) {
        let id = handle.id();
        match self.records.iter_mut().find(|record| record.handle.id() == id) {
            Some(record) => record.visible |= step_visible,
            None => self.records.push(ModelRecord {
                handle: handle.clone(),
                visible: step_visible,
                state: ModelState::Pending,
                disposed: false,
            }),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn state_of(&self, handle: &ModelHandle) -> Option<ModelState> {
        let id = handle.id();
        self.records
            .iter()
            .find(|record| record.handle.id() == id)
            .map(|record| record.state)
    }

    /// Finish every visible pending model, continuing past failures.
    ///
    /// Returns the first failure.
    pub(crate) fn finish_visible(&mut self) -> Option<WizardError> {
        let mut first_error = None;
        for record in self
            .records
            .iter_mut()
            .filter(|record| record.visible && record.state == ModelState::Pending)
        {
            record.state = ModelState::Finished;
            tracing::debug!(target: targets::MODEL, model = record.handle.name(), "finishing model");
            if let Err(source) = record.handle.model().handle_finished() {
                tracing::error!(
                    target: targets::MODEL,
                    model = record.handle.name(),
                    error = %source,
                    "model failed to finish"
                );
                first_error.get_or_insert_with(|| WizardError::model_finish(record.handle.name(), source));
            }
        }
        first_error
    }

    /// Skip every pending model none of whose steps were visible.
    pub(crate) fn skip_hidden(&mut self) {
        for record in self
            .records
            .iter_mut()
            .filter(|record| !record.visible && record.state == ModelState::Pending)
        {
            record.state = ModelState::Skipped;
            tracing::debug!(target: targets::MODEL, model = record.handle.name(), "skipping model");
            record.handle.model().handle_skipped();
        }
    }

    pub(crate) fn dispose_all(&mut self) {
        for record in self.records.iter_mut().filter(|record| !record.disposed) {
            record.disposed = true;
            record.handle.model().dispose();
        }
    }
}

static_assertions::assert_impl_all!(ModelHandle: Send, Sync);
