//! Deferred navigation requests from steps.
//!
//! Steps receive a [`WizardFacade`] in
//! [`on_wizard_starting`](crate::WizardStep::on_wizard_starting). A step
//! cannot drive the wizard while one of its own hooks is running, so the
//! facade queues requests; the host runs them with
//! [`ModelWizard::process_pending_requests`](crate::ModelWizard::process_pending_requests),
//! usually once per turn of its event loop.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use stepwise_core::logging::targets;

use crate::navigation::NavigationProperties;

/// A navigation request queued by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacadeRequest {
    /// Advance as if the user pressed "Next".
    GoForward,
    /// Go back one visible step.
    GoBack,
    /// Cancel the wizard.
    Cancel,
    /// Recompute the navigation properties now.
    UpdateNavigationProperties,
}

pub(crate) type RequestQueue = Arc<Mutex<VecDeque<FacadeRequest>>>;

/// A cloneable handle through which steps request navigation.
#[derive(Clone)]
pub struct WizardFacade {
    requests: RequestQueue,
    navigation: Arc<NavigationProperties>,
}

impl WizardFacade {
    pub(crate) fn new(requests: RequestQueue, navigation: Arc<NavigationProperties>) -> Self {
        Self {
            requests,
            navigation,
        }
    }

    fn push(&self, request: FacadeRequest) {
        tracing::trace!(target: targets::NAVIGATION, ?request, "queued facade request");
        self.requests.lock().push_back(request);
    }

    /// Request forward navigation.
    pub fn go_forward(&self) {
        self.push(FacadeRequest::GoForward);
    }

    /// Request backward navigation.
    pub fn go_back(&self) {
        self.push(FacadeRequest::GoBack);
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.push(FacadeRequest::Cancel);
    }

    /// Request a recompute of the navigation properties.
    pub fn update_navigation_properties(&self) {
        self.push(FacadeRequest::UpdateNavigationProperties);
    }

    /// Whether the wizard has finished or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.navigation.finished().get()
    }

    /// Last computed forward-navigation flag.
    pub fn can_go_forward(&self) -> bool {
        self.navigation.can_go_forward().get()
    }

    /// Number of requests waiting to be processed.
    pub fn pending_requests(&self) -> usize {
        self.requests.lock().len()
    }
}

impl fmt::Debug for WizardFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardFacade")
            .field("pending_requests", &self.pending_requests())
            .field("finished", &self.is_finished())
            .finish()
    }
}

static_assertions::assert_impl_all!(WizardFacade: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_queue_in_order() {
        let requests: RequestQueue = Arc::default();
        let facade = WizardFacade::new(requests.clone(), NavigationProperties::new());
        let clone = facade.clone();

        facade.go_forward();
        clone.update_navigation_properties();
        facade.go_back();
        clone.cancel();

        assert_eq!(facade.pending_requests(), 4);
        assert_eq!(
            requests.lock().iter().copied().collect::<Vec<_>>(),
            vec![
                FacadeRequest::GoForward,
                FacadeRequest::UpdateNavigationProperties,
                FacadeRequest::GoBack,
                FacadeRequest::Cancel,
            ]
        );
    }

    #[test]
    fn test_reads_navigation_state() {
        let navigation = NavigationProperties::new();
        let facade = WizardFacade::new(Arc::default(), navigation.clone());
        assert!(!facade.can_go_forward());

        navigation.can_go_forward().set(true);
        navigation.finished().set(true);
        assert!(facade.can_go_forward());
        assert!(facade.is_finished());
    }
}
