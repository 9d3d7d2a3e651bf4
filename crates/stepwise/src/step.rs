//! Wizard steps.
//!
//! A [`WizardStep`] is one page of a wizard. Every hook except
//! [`title`](WizardStep::title) and [`model`](WizardStep::model) has a
//! default, so a minimal step only names itself and its model.
//!
//! Lifecycle of a step inside a [`ModelWizard`](crate::ModelWizard):
//!
//! 1. [`create_dependent_steps`](WizardStep::create_dependent_steps) once,
//!    while the step tree is flattened.
//! 2. [`on_wizard_starting`](WizardStep::on_wizard_starting) once, before
//!    visibility is decided.
//! 3. [`should_show`](WizardStep::should_show) once.
//! 4. [`on_entering`](WizardStep::on_entering) whenever the step becomes
//!    current, and [`on_proceeding`](WizardStep::on_proceeding) before the
//!    wizard moves forward past it.
//! 5. [`dispose`](WizardStep::dispose) once at teardown, shown or not.

use std::sync::Arc;

use stepwise_core::ObservableBool;

use crate::error::HookResult;
use crate::facade::WizardFacade;
use crate::model::{ModelHandle, WizardModel};

/// A boxed step, as stored by the wizard.
pub type BoxedStep = Box<dyn WizardStep>;

/// A single page of a wizard.
pub trait WizardStep {
    /// Title shown while this step is current.
    fn title(&self) -> &str;

    /// The model this step reads and writes.
    fn model(&self) -> ModelHandle;

    /// Whether this step takes part in navigation. Evaluated once at build.
    fn should_show(&self) -> bool {
        true
    }

    /// Steps inserted directly after this one. Called once at build.
    fn create_dependent_steps(&mut self) -> Vec<BoxedStep> {
        Vec::new()
    }

    /// Called once for every flattened step, hidden or not.
    fn on_wizard_starting(&mut self, facade: &WizardFacade) {
        let _ = facade;
    }

    /// Called when navigation lands on this step.
    ///
    /// Returning an error keeps the wizard on the step it was leaving.
    fn on_entering(&mut self) -> HookResult {
        Ok(())
    }

    /// Whether forward navigation is currently allowed.
    fn can_go_forward(&self) -> ObservableBool {
        ObservableBool::always_true()
    }

    /// Whether backward navigation is allowed from this step.
    fn can_go_back(&self) -> bool {
        true
    }

    /// Called right before the wizard moves forward past this step.
    ///
    /// Returning an error keeps the wizard on this step.
    fn on_proceeding(&mut self) -> HookResult {
        Ok(())
    }

    /// Identifier of the element that should receive focus when shown.
    fn preferred_focus(&self) -> Option<String> {
        None
    }

    /// Release resources. Called exactly once at wizard teardown.
    fn dispose(&mut self) {}
}

/// Title and typed model shared by most step implementations.
///
/// ```
/// use std::sync::Arc;
/// use stepwise::{HookResult, ModelHandle, StepBase, WizardModel, WizardStep};
///
/// struct Counter;
/// impl WizardModel for Counter {
///     fn handle_finished(&self) -> HookResult {
///         Ok(())
///     }
/// }
///
/// struct CountStep {
///     base: StepBase<Counter>,
/// }
///
/// impl WizardStep for CountStep {
///     fn title(&self) -> &str {
///         self.base.title()
///     }
///
///     fn model(&self) -> ModelHandle {
///         self.base.handle()
///     }
/// }
///
/// let step = CountStep { base: StepBase::new(Arc::new(Counter), "Count") };
/// assert_eq!(step.title(), "Count");
/// ```
#[derive(Debug)]
pub struct StepBase<M> {
    model: Arc<M>,
    title: String,
}

impl<M: WizardModel> StepBase<M> {
    /// Create a step base for `model`.
    pub fn new(model: Arc<M>, title: impl Into<String>) -> Self {
        Self {
            model,
            title: title.into(),
        }
    }

    /// The typed model.
    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// A type-erased handle to the model.
    pub fn handle(&self) -> ModelHandle {
        ModelHandle::from(&self.model)
    }

    /// The step title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replace the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;

    impl WizardModel for Empty {
        fn handle_finished(&self) -> HookResult {
            Ok(())
        }
    }

    struct MinimalStep {
        base: StepBase<Empty>,
    }

    impl WizardStep for MinimalStep {
        fn title(&self) -> &str {
            self.base.title()
        }

        fn model(&self) -> ModelHandle {
            self.base.handle()
        }
    }

    #[test]
    fn test_default_hooks() {
        let mut step = MinimalStep {
            base: StepBase::new(Arc::new(Empty), "Minimal"),
        };
        assert!(step.should_show());
        assert!(step.can_go_back());
        assert!(step.can_go_forward().get());
        assert!(step.can_go_forward().is_constant());
        assert!(step.preferred_focus().is_none());
        assert!(step.create_dependent_steps().is_empty());
        assert!(step.on_entering().is_ok());
        assert!(step.on_proceeding().is_ok());
    }

    #[test]
    fn test_step_base_shares_model() {
        let model = Arc::new(Empty);
        let mut base = StepBase::new(model.clone(), "First");
        assert!(Arc::ptr_eq(base.model(), &model));
        assert!(base.handle().ptr_eq(&ModelHandle::from(&model)));

        base.set_title("Renamed");
        assert_eq!(base.title(), "Renamed");
    }
}
