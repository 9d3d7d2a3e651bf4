//! Result listeners.
//!
//! Listeners are notified when the wizard ends and whenever a step hook
//! aborts a transition. They are thin adapters over the wizard's
//! [`finished`](crate::ModelWizard::finished) and
//! [`advance_error`](crate::ModelWizard::advance_error) signals.

use stepwise_core::ConnectionId;

use crate::error::WizardError;

/// How a wizard ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WizardResult {
    finished: bool,
}

impl WizardResult {
    /// The wizard ran to completion.
    pub fn finished() -> Self {
        Self { finished: true }
    }

    /// The wizard was cancelled.
    pub fn cancelled() -> Self {
        Self { finished: false }
    }

    /// Whether the wizard ran to completion.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Receives wizard outcome notifications.
pub trait WizardListener: Send + Sync {
    /// Called once when the wizard finishes or is cancelled.
    fn on_wizard_finished(&self, result: &WizardResult);

    /// Called when a step hook aborts navigation.
    fn on_wizard_advance_error(&self, error: &WizardError) {
        let _ = error;
    }
}

/// Handle returned by [`add_result_listener`](crate::ModelWizard::add_result_listener).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId {
    pub(crate) finished: ConnectionId,
    pub(crate) advance_error: ConnectionId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results() {
        assert!(WizardResult::finished().is_finished());
        assert!(!WizardResult::cancelled().is_finished());
        assert_ne!(WizardResult::finished(), WizardResult::cancelled());
    }
}
