//! Error types for Stepwise core primitives.

/// Errors raised by invoke strategies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    /// `flush()` was called from inside an invocation that is being flushed.
    #[error("Batch flush re-entered while a flush is already running")]
    ReentrantFlush,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            InvokeError::ReentrantFlush.to_string(),
            "Batch flush re-entered while a flush is already running"
        );
    }
}
