//! Error types for the wizard engine.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Result type alias for wizard operations.
pub type Result<T> = std::result::Result<T, WizardError>;

/// Result type returned by step and model hooks.
pub type HookResult<T = ()> = std::result::Result<T, HookError>;

/// An error raised by a step or model hook.
///
/// Hook errors are cloneable so a single failure can be returned to the
/// caller and broadcast to listeners at the same time.
#[derive(Clone)]
pub struct HookError {
    message: String,
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl HookError {
    /// Create a hook error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it as the source.
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Arc::new(error)),
        }
    }

    /// Attach a message to an underlying error.
    pub fn with_source<E>(message: impl Into<String>, error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Arc::new(error)),
        }
    }

    /// The human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("HookError");
        debug.field("message", &self.message);
        if let Some(source) = &self.source {
            debug.field("source", &source.to_string());
        }
        debug.finish()
    }
}

impl StdError for HookError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// The step hook that failed during a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepPhase {
    /// The step was being entered.
    Entering,
    /// The step was being left by forward navigation.
    Proceeding,
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entering => f.write_str("entering"),
            Self::Proceeding => f.write_str("proceeding"),
        }
    }
}

/// Errors produced by the wizard engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WizardError {
    /// Every flattened step was hidden at construction.
    #[error("Wizard has no visible steps")]
    NoVisibleSteps,

    /// Navigation was attempted after the wizard finished or was cancelled.
    #[error("Cannot {operation}: the wizard has already finished")]
    AlreadyFinished { operation: &'static str },

    /// Navigation was attempted after the wizard was disposed.
    #[error("Cannot {operation}: the wizard has been disposed")]
    Disposed { operation: &'static str },

    /// `go_back` was called on the first visible step.
    #[error("Cannot go back: there is no previous visible step")]
    NoPreviousStep,

    /// A step hook failed and the transition was aborted.
    #[error("Step '{step}' failed while {phase}: {source}")]
    StepTransition {
        step: String,
        index: usize,
        phase: StepPhase,
        #[source]
        source: HookError,
    },

    /// A model failed while handling completion. The wizard is still finished.
    #[error("Model '{model}' failed to finish: {source}")]
    ModelFinish {
        model: String,
        #[source]
        source: HookError,
    },
}

impl WizardError {
    /// Create a step transition error.
    pub fn step_transition(
        step: impl Into<String>,
        index: usize,
        phase: StepPhase,
        source: HookError,
    ) -> Self {
        Self::StepTransition {
            step: step.into(),
            index,
            phase,
            source,
        }
    }

    /// Create a model finish error.
    pub fn model_finish(model: impl Into<String>, source: HookError) -> Self {
        Self::ModelFinish {
            model: model.into(),
            source,
        }
    }

    /// Whether navigation can be retried after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StepTransition { .. })
    }

    /// The hook error behind a step or model failure, if any.
    pub fn hook_error(&self) -> Option<&HookError> {
        match self {
            Self::StepTransition { source, .. } | Self::ModelFinish { source, .. } => Some(source),
            _ => None,
        }
    }
}

static_assertions::assert_impl_all!(HookError: Send, Sync, Clone);
static_assertions::assert_impl_all!(WizardError: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct ParseFailure;

    impl fmt::Display for ParseFailure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("age is not a number")
        }
    }

    impl StdError for ParseFailure {}

    #[test]
    fn test_hook_error_message() {
        let error = HookError::new("name must not be empty");
        assert_eq!(error.message(), "name must not be empty");
        assert_eq!(error.to_string(), "name must not be empty");
        assert!(error.source().is_none());

        let from_str: HookError = "boom".into();
        assert_eq!(from_str.message(), "boom");
    }

    #[test]
    fn test_hook_error_keeps_source() {
        let error = HookError::with_source("invalid input", ParseFailure);
        assert_eq!(error.to_string(), "invalid input");
        let source = error.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("age is not a number"));

        let wrapped = HookError::from_error(ParseFailure);
        assert_eq!(wrapped.message(), "age is not a number");

        let cloned = wrapped.clone();
        assert!(cloned.source().is_some());
    }

    #[test]
    fn test_step_transition_display() {
        let error = WizardError::step_transition(
            "Age",
            2,
            StepPhase::Proceeding,
            HookError::new("age out of range"),
        );
        assert_eq!(
            error.to_string(),
            "Step 'Age' failed while proceeding: age out of range"
        );
        assert!(error.is_recoverable());
        assert_eq!(error.hook_error().map(HookError::message), Some("age out of range"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_misuse_errors() {
        let error = WizardError::AlreadyFinished {
            operation: "go forward",
        };
        assert_eq!(
            error.to_string(),
            "Cannot go forward: the wizard has already finished"
        );
        assert!(!error.is_recoverable());
        assert!(error.hook_error().is_none());
        assert!(!WizardError::NoVisibleSteps.is_recoverable());
        assert!(!WizardError::model_finish("Person", HookError::new("x")).is_recoverable());
    }
}
