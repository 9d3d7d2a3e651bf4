//! Property system for Stepwise.
//!
//! Properties are the data backbone of wizard models: a model shared by
//! several steps keeps its fields in properties so every step can read and
//! write them through a shared reference.
//!
//! # Property Types
//!
//! - **Property<T>**: A value with change detection; the caller decides
//!   whether to notify anyone
//! - **ValueProperty<T>**: A property that owns a `changed` signal and emits
//!   it whenever the value actually changes
//!
//! # Example
//!
//! ```
//! use stepwise_core::Property;
//!
//! struct PersonModel {
//!     name: Property<String>,
//!     age: Property<u32>,
//! }
//!
//! let person = PersonModel {
//!     name: Property::new(String::new()),
//!     age: Property::new(0),
//! };
//!
//! assert!(person.name.set("John Doe".to_string()));
//! assert!(!person.age.set(0));
//! assert_eq!(person.name.get(), "John Doe");
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::logging::targets;
use crate::signal::{ConnectionGuard, ConnectionId, Signal};

/// A property that tracks changes.
///
/// `Property<T>` wraps a value and provides change detection. When `set()` is
/// called, it compares the new value with the current one and returns whether
/// the value actually changed.
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        self.replace(value).is_some()
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

/// A property that notifies listeners whenever its value changes.
///
/// The `changed` signal carries the new value and is emitted after the
/// internal lock has been released, so slots may read the property again.
pub struct ValueProperty<T> {
    value: Property<T>,
    /// Emitted with the new value after every effective change.
    pub changed: Signal<T>,
}

/// Settable boolean used as the leaf of observable boolean expressions.
pub type BoolValueProperty = ValueProperty<bool>;

impl<T: Clone + PartialEq + Send + Sync + 'static> ValueProperty<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: Property::new(value),
            changed: Signal::new(),
        }
    }

    /// Create a new shared property.
    pub fn shared(value: T) -> Arc<Self> {
        Arc::new(Self::new(value))
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.get()
    }

    /// Set the value, emitting `changed` if it differs from the current one.
    ///
    /// Returns `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        if self.value.replace(value.clone()).is_some() {
            tracing::trace!(target: targets::PROPERTY, "property changed, notifying");
            self.changed.emit(value);
            true
        } else {
            false
        }
    }

    /// Connect a slot to the `changed` signal.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.changed.connect(slot)
    }

    /// Connect a slot that is disconnected when the returned guard drops.
    pub fn connect_scoped<F>(self: &Arc<Self>, slot: F) -> ConnectionGuard
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.changed.connect(slot);
        let property: Weak<Self> = Arc::downgrade(self);
        ConnectionGuard::new(move || {
            if let Some(property) = property.upgrade() {
                property.changed.disconnect(id);
            }
        })
    }
}

impl<T: Clone + PartialEq + Send + Sync + Default + 'static> Default for ValueProperty<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for ValueProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueProperty")
            .field("value", &self.value.get())
            .field("listeners", &self.changed.connection_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(Property<String>: Send, Sync);
static_assertions::assert_impl_all!(BoolValueProperty: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_property_set_detects_change() {
        let prop = Property::new(10);

        assert!(!prop.set(10));
        assert_eq!(prop.get(), 10);

        assert!(prop.set(20));
        assert_eq!(prop.get(), 20);
    }

    #[test]
    fn test_property_replace() {
        let prop = Property::new("hello".to_string());

        assert!(prop.replace("hello".to_string()).is_none());
        assert_eq!(prop.replace("world".to_string()), Some("hello".to_string()));
        assert_eq!(prop.get(), "world");
    }

    #[test]
    fn test_property_default() {
        let prop: Property<String> = Property::default();
        assert_eq!(prop.get(), "");
    }

    #[test]
    fn test_value_property_emits_only_on_change() {
        let prop = ValueProperty::new(false);
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        prop.connect(move |&value| received_clone.lock().push(value));

        assert!(prop.set(true));
        assert!(!prop.set(true));
        assert!(prop.set(false));

        assert_eq!(*received.lock(), vec![true, false]);
    }

    #[test]
    fn test_value_property_slot_can_read_back() {
        let prop = ValueProperty::shared(1);
        let seen = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&prop);
        let seen_clone = seen.clone();
        prop.connect(move |_| {
            if let Some(prop) = weak.upgrade() {
                seen_clone.store(prop.get(), Ordering::SeqCst);
            }
        });

        prop.set(7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_value_property_scoped_connection() {
        let prop = BoolValueProperty::shared(false);
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = count.clone();
        let guard = prop.connect_scoped(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        prop.set(true);
        drop(guard);
        prop.set(false);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(prop.changed.connection_count(), 0);
    }
}
