//! Invoke strategies for deferred recomputation.
//!
//! When an observable changes, consumers that cache derived state do not
//! recompute inline. They hand a closure to an [`InvokeStrategy`], which
//! decides when it runs:
//!
//! - [`ImmediateInvokeStrategy`] runs the closure right away.
//! - [`BatchInvokeStrategy`] queues closures until [`BatchInvokeStrategy::flush`]
//!   is called, typically once per turn of the host's event loop. Tests use
//!   it to observe state before and after a recompute.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::InvokeError;
use crate::logging::targets;

/// A deferred unit of work.
pub type Invocation = Box<dyn FnOnce() + Send>;

/// Decides when a deferred invocation runs.
pub trait InvokeStrategy: Send + Sync {
    /// Schedule `invocation` to run.
    fn invoke(&self, invocation: Invocation);
}

/// Runs every invocation immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateInvokeStrategy;

impl InvokeStrategy for ImmediateInvokeStrategy {
    fn invoke(&self, invocation: Invocation) {
        invocation();
    }
}

/// Queues invocations until they are flushed.
pub struct BatchInvokeStrategy {
    pending: Mutex<VecDeque<Invocation>>,
    flushing: AtomicBool,
}

impl BatchInvokeStrategy {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            flushing: AtomicBool::new(false),
        }
    }

    /// Number of queued invocations.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether any invocation is waiting to run.
    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// Run queued invocations in FIFO order until the queue is empty.
    ///
    /// Invocations queued while flushing run in the same flush. Returns the
    /// number of invocations that ran.
    pub fn flush(&self) -> Result<usize, InvokeError> {
        if self.flushing.swap(true, Ordering::AcqRel) {
            return Err(InvokeError::ReentrantFlush);
        }
        let _flushing = FlushingGuard(&self.flushing);

        let mut ran = 0;
        loop {
            // The lock is released before each invocation runs.
            let next = self.pending.lock().pop_front();
            match next {
                Some(invocation) => {
                    invocation();
                    ran += 1;
                }
                None => break,
            }
        }

        tracing::trace!(target: targets::INVOKE, ran, "flushed batch invocations");
        Ok(ran)
    }
}

/// Clears the flushing flag when a flush ends, including by panic.
struct FlushingGuard<'a>(&'a AtomicBool);

impl Drop for FlushingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for BatchInvokeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl InvokeStrategy for BatchInvokeStrategy {
    fn invoke(&self, invocation: Invocation) {
        self.pending.lock().push_back(invocation);
    }
}

impl fmt::Debug for BatchInvokeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchInvokeStrategy")
            .field("pending", &self.pending_count())
            .field("flushing", &self.flushing.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_immediate_runs_inline() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        ImmediateInvokeStrategy.invoke(Box::new(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_batch_defers_until_flush() {
        let batch = BatchInvokeStrategy::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            batch.invoke(Box::new(move || order.lock().push(i)));
        }

        assert_eq!(batch.pending_count(), 3);
        assert!(order.lock().is_empty());

        assert_eq!(batch.flush(), Ok(3));
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert!(!batch.has_pending());
        assert_eq!(batch.flush(), Ok(0));
    }

    #[test]
    fn test_batch_runs_invocations_queued_during_flush() {
        let batch = Arc::new(BatchInvokeStrategy::new());
        let count = Arc::new(AtomicUsize::new(0));

        let inner_batch = batch.clone();
        let inner_count = count.clone();
        batch.invoke(Box::new(move || {
            let inner_count = inner_count.clone();
            inner_batch.invoke(Box::new(move || {
                inner_count.fetch_add(1, Ordering::SeqCst);
            }));
        }));

        assert_eq!(batch.flush(), Ok(2));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_batch_rejects_reentrant_flush() {
        let batch = Arc::new(BatchInvokeStrategy::new());
        let result = Arc::new(Mutex::new(None));

        let inner_batch = batch.clone();
        let inner_result = result.clone();
        batch.invoke(Box::new(move || {
            *inner_result.lock() = Some(inner_batch.flush());
        }));

        assert_eq!(batch.flush(), Ok(1));
        assert_eq!(*result.lock(), Some(Err(InvokeError::ReentrantFlush)));
    }

    #[test]
    fn test_batch_recovers_after_panicking_invocation() {
        let batch = BatchInvokeStrategy::new();
        batch.invoke(Box::new(|| panic!("invocation failed")));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| batch.flush()));
        assert!(result.is_err());

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        batch.invoke(Box::new(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(batch.flush(), Ok(1));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
