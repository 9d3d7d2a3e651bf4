//! Thread affinity verification.
//!
//! Wizard navigation is driven from a single control thread (the host's UI
//! thread). Types that must stay on that thread record a [`ThreadAffinity`]
//! when they are created and check it on every mutating call.
//!
//! ```
//! use stepwise_core::thread_check::ThreadAffinity;
//!
//! struct Controller {
//!     affinity: ThreadAffinity,
//!     value: std::cell::Cell<i32>,
//! }
//!
//! impl Controller {
//!     fn set_value(&self, v: i32) {
//!         self.affinity.assert_same_thread("set_value");
//!         self.value.set(v);
//!     }
//! }
//!
//! let controller = Controller {
//!     affinity: ThreadAffinity::current(),
//!     value: std::cell::Cell::new(0),
//! };
//! controller.set_value(3);
//! ```

use std::thread::ThreadId;

/// Records the thread on which an object was created.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Bind to the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Panic if called from a thread other than the bound one.
    ///
    /// `operation` names the call being checked and appears in the message.
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message if called from a different thread.
    #[inline]
    pub fn assert_same_thread(&self, operation: &str) {
        if !self.is_same_thread() {
            self.panic_wrong_thread(operation);
        }
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, operation: &str) -> ! {
        let current = std::thread::current();
        let current_name = current.name().unwrap_or("<unnamed>");
        let current_id = current.id();

        panic!(
            "thread affinity violation: `{operation}` called from thread \"{current_name}\" \
             ({current_id:?}) but the owner was created on {:?}; navigation must stay on \
             the control thread",
            self.thread_id
        )
    }
}
