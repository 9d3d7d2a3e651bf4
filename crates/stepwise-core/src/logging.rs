//! Logging facilities for Stepwise.
//!
//! Stepwise uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("stepwise=debug,stepwise_core=trace")
//!         .init();
//! }
//! ```

/// Span names used throughout Stepwise for tracing.
pub mod span_names {
    /// Wizard construction span.
    pub const WIZARD_BUILD: &str = "stepwise::build";
    /// Wizard completion span.
    pub const WIZARD_FINISH: &str = "stepwise::finish";
    /// Wizard teardown span.
    pub const WIZARD_DISPOSE: &str = "stepwise::dispose";
}

/// Target names for log filtering.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "stepwise_core::signal";
    /// Property system target.
    pub const PROPERTY: &str = "stepwise_core::property";
    /// Invoke strategies target.
    pub const INVOKE: &str = "stepwise_core::invoke";
    /// Wizard engine target.
    pub const WIZARD: &str = "stepwise::wizard";
    /// Wizard navigation target.
    pub const NAVIGATION: &str = "stepwise::navigation";
    /// Model lifecycle target.
    pub const MODEL: &str = "stepwise::model";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time wizard operations such as construction and completion.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new performance span for `operation`.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::debug_span!(target: "stepwise::perf", "perf", operation);
        Self {
            _span: span.entered(),
        }
    }
}
