//! Observable boolean expressions.
//!
//! An [`ObservableBool`] is a cheap, cloneable handle to a boolean that can
//! be read at any time with [`ObservableBool::get`] and observed for
//! invalidation with [`ObservableBool::subscribe`]. Expressions are built from
//! constants and [`BoolValueProperty`] leaves, combined with `&`, `|` and `!`.
//!
//! Reads are always computed from the current leaf values, so a consumer that
//! only needs the value at decision time never has to wait for a recompute.
//! Subscriptions exist for consumers that cache derived state and want to be
//! told when to refresh it.
//!
//! # Example
//!
//! ```
//! use stepwise_core::{BoolValueProperty, ObservableBool};
//!
//! let name_valid = BoolValueProperty::shared(false);
//! let accepted_terms = BoolValueProperty::shared(true);
//!
//! let can_continue = ObservableBool::from(&name_valid) & ObservableBool::from(&accepted_terms);
//! assert!(!can_continue.get());
//!
//! name_valid.set(true);
//! assert!(can_continue.get());
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use crate::property::BoolValueProperty;
use crate::signal::ConnectionGuard;

enum Node {
    Constant(bool),
    Value(Arc<BoolValueProperty>),
    Not(ObservableBool),
    And(ObservableBool, ObservableBool),
    Or(ObservableBool, ObservableBool),
}

/// A composable, observable boolean.
#[derive(Clone)]
pub struct ObservableBool {
    node: Arc<Node>,
}

impl ObservableBool {
    /// An expression that is always `value`.
    pub fn constant(value: bool) -> Self {
        Self::from_node(Node::Constant(value))
    }

    /// Shorthand for `ObservableBool::constant(true)`.
    pub fn always_true() -> Self {
        Self::constant(true)
    }

    /// Shorthand for `ObservableBool::constant(false)`.
    pub fn always_false() -> Self {
        Self::constant(false)
    }

    /// An expression that mirrors a settable boolean property.
    pub fn value(property: &Arc<BoolValueProperty>) -> Self {
        Self::from_node(Node::Value(Arc::clone(property)))
    }

    fn from_node(node: Node) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// Evaluate the expression against the current leaf values.
    pub fn get(&self) -> bool {
        match &*self.node {
            Node::Constant(value) => *value,
            Node::Value(property) => property.get(),
            Node::Not(inner) => !inner.get(),
            Node::And(lhs, rhs) => lhs.get() && rhs.get(),
            Node::Or(lhs, rhs) => lhs.get() || rhs.get(),
        }
    }

    /// Logical AND of two expressions.
    pub fn and(&self, other: &ObservableBool) -> Self {
        Self::from_node(Node::And(self.clone(), other.clone()))
    }

    /// Logical OR of two expressions.
    pub fn or(&self, other: &ObservableBool) -> Self {
        Self::from_node(Node::Or(self.clone(), other.clone()))
    }

    /// Logical negation.
    pub fn negate(&self) -> Self {
        Self::from_node(Node::Not(self.clone()))
    }

    /// Whether the expression can never change.
    pub fn is_constant(&self) -> bool {
        match &*self.node {
            Node::Constant(_) => true,
            Node::Value(_) => false,
            Node::Not(inner) => inner.is_constant(),
            Node::And(lhs, rhs) | Node::Or(lhs, rhs) => lhs.is_constant() && rhs.is_constant(),
        }
    }

    /// Number of distinct settable properties this expression reads.
    pub fn dependency_count(&self) -> usize {
        self.leaves().len()
    }

    /// Call `on_invalidated` whenever any leaf of this expression changes.
    ///
    /// The callback does not receive the new value; read it with
    /// [`get`](Self::get) once the caller is ready to recompute. A leaf that
    /// appears several times in the expression is only observed once.
    pub fn subscribe<F>(&self, on_invalidated: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: Arc<dyn Fn() + Send + Sync> = Arc::new(on_invalidated);
        let guards = self
            .leaves()
            .into_iter()
            .map(|leaf| {
                let callback = Arc::clone(&callback);
                leaf.connect_scoped(move |_| callback())
            })
            .collect();
        Subscription { guards }
    }

    fn leaves(&self) -> Vec<Arc<BoolValueProperty>> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves(&self, out: &mut Vec<Arc<BoolValueProperty>>) {
        match &*self.node {
            Node::Constant(_) => {}
            Node::Value(property) => {
                if !out.iter().any(|seen| Arc::ptr_eq(seen, property)) {
                    out.push(Arc::clone(property));
                }
            }
            Node::Not(inner) => inner.collect_leaves(out),
            Node::And(lhs, rhs) | Node::Or(lhs, rhs) => {
                lhs.collect_leaves(out);
                rhs.collect_leaves(out);
            }
        }
    }
}

impl Default for ObservableBool {
    fn default() -> Self {
        Self::always_true()
    }
}

impl From<bool> for ObservableBool {
    fn from(value: bool) -> Self {
        Self::constant(value)
    }
}

impl From<&Arc<BoolValueProperty>> for ObservableBool {
    fn from(property: &Arc<BoolValueProperty>) -> Self {
        Self::value(property)
    }
}

impl From<Arc<BoolValueProperty>> for ObservableBool {
    fn from(property: Arc<BoolValueProperty>) -> Self {
        Self::from_node(Node::Value(property))
    }
}

impl BitAnd for ObservableBool {
    type Output = ObservableBool;

    fn bitand(self, rhs: ObservableBool) -> ObservableBool {
        self.and(&rhs)
    }
}

impl BitOr for ObservableBool {
    type Output = ObservableBool;

    fn bitor(self, rhs: ObservableBool) -> ObservableBool {
        self.or(&rhs)
    }
}

impl Not for ObservableBool {
    type Output = ObservableBool;

    fn not(self) -> ObservableBool {
        self.negate()
    }
}

impl fmt::Debug for ObservableBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.node {
            Node::Constant(value) => write!(f, "{value}"),
            Node::Value(property) => write!(f, "value({})", property.get()),
            Node::Not(inner) => write!(f, "!{inner:?}"),
            Node::And(lhs, rhs) => write!(f, "({lhs:?} & {rhs:?})"),
            Node::Or(lhs, rhs) => write!(f, "({lhs:?} | {rhs:?})"),
        }
    }
}

/// Keeps an [`ObservableBool::subscribe`] callback connected.
///
/// Dropping the subscription disconnects from every leaf.
#[must_use = "dropping the subscription stops invalidation callbacks"]
#[derive(Debug)]
pub struct Subscription {
    guards: Vec<ConnectionGuard>,
}

impl Subscription {
    /// A subscription that observes nothing.
    pub fn empty() -> Self {
        Self { guards: Vec::new() }
    }

    /// Whether this subscription observes at least one leaf.
    pub fn is_active(&self) -> bool {
        !self.guards.is_empty()
    }
}

static_assertions::assert_impl_all!(ObservableBool: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_constants() {
        assert!(ObservableBool::always_true().get());
        assert!(!ObservableBool::always_false().get());
        assert!(ObservableBool::default().get());
        assert!(ObservableBool::from(false).is_constant());
    }

    #[test]
    fn test_composition_tracks_leaves() {
        let a = BoolValueProperty::shared(true);
        let b = BoolValueProperty::shared(false);

        let both = ObservableBool::from(&a) & ObservableBool::from(&b);
        let either = ObservableBool::from(&a) | ObservableBool::from(&b);
        let not_a = !ObservableBool::from(&a);

        assert!(!both.get());
        assert!(either.get());
        assert!(!not_a.get());

        b.set(true);
        a.set(false);
        assert!(!both.get());
        assert!(either.get());
        assert!(not_a.get());
        assert!(!both.is_constant());
    }

    #[test]
    fn test_subscribe_fires_on_leaf_change() {
        let a = BoolValueProperty::shared(true);
        let b = BoolValueProperty::shared(true);
        let expr = ObservableBool::from(&a).and(&ObservableBool::from(&b));

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let subscription = expr.subscribe(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert!(subscription.is_active());

        a.set(false);
        b.set(false);
        b.set(false);
        assert_eq!(count.load(Ordering::SeqCst), 2);

        drop(subscription);
        a.set(true);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_repeated_leaf_observed_once() {
        let a = BoolValueProperty::shared(false);
        let expr = ObservableBool::from(&a) | !ObservableBool::from(&a);
        assert_eq!(expr.dependency_count(), 1);

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let _subscription = expr.subscribe(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        a.set(true);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_constant_subscription_is_inactive() {
        let subscription = ObservableBool::always_true().subscribe(|| {});
        assert!(!subscription.is_active());
        assert!(!Subscription::empty().is_active());
    }
}
