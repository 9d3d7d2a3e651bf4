//! Core primitives for Stepwise.
//!
//! This crate provides the host-framework pieces the wizard engine is built on:
//!
//! - **Signal/Slot System**: Type-safe, synchronous change notification
//! - **Property System**: Shared values with change detection
//! - **Observable Booleans**: Composable conditions with invalidation callbacks
//! - **Invoke Strategies**: Immediate or batched recomputation of derived state
//! - **Thread Affinity**: Checks that keep navigation on its control thread
//!
//! # Example
//!
//! ```
//! use stepwise_core::{BatchInvokeStrategy, BoolValueProperty, InvokeStrategy, ObservableBool};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! let valid = BoolValueProperty::shared(false);
//! let condition = ObservableBool::from(&valid);
//!
//! let batch = Arc::new(BatchInvokeStrategy::new());
//! let cached = Arc::new(AtomicBool::new(condition.get()));
//!
//! let (batch_ref, cached_ref, condition_ref) = (batch.clone(), cached.clone(), condition.clone());
//! let _subscription = condition.subscribe(move || {
//!     let (cached, condition) = (cached_ref.clone(), condition_ref.clone());
//!     batch_ref.invoke(Box::new(move || cached.store(condition.get(), Ordering::SeqCst)));
//! });
//!
//! valid.set(true);
//! assert!(!cached.load(Ordering::SeqCst));
//! batch.flush().unwrap();
//! assert!(cached.load(Ordering::SeqCst));
//! ```

mod error;
pub mod invoke;
pub mod logging;
pub mod observable;
pub mod property;
pub mod signal;
pub mod thread_check;

pub use error::InvokeError;
pub use invoke::{BatchInvokeStrategy, ImmediateInvokeStrategy, Invocation, InvokeStrategy};
pub use logging::PerfSpan;
pub use observable::{ObservableBool, Subscription};
pub use property::{BoolValueProperty, Property, ValueProperty};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
