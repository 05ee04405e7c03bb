use std::sync::{Arc, Mutex, PoisonError};

use shared::protocol::NavigationRequest;

/// Fire-and-forget access to the navigation stack.
pub trait Navigator {
    fn navigate(&mut self, request: NavigationRequest);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn navigate(&mut self, request: NavigationRequest) {
        (**self).navigate(request);
    }
}

impl<N: Navigator + ?Sized> Navigator for Box<N> {
    fn navigate(&mut self, request: NavigationRequest) {
        (**self).navigate(request);
    }
}

/// Keeps every request it receives. Clones share one log, so a copy kept
/// outside a controller observes what the controller navigated to.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    log: Arc<Mutex<Vec<NavigationRequest>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<NavigationRequest> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn last(&self) -> Option<NavigationRequest> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, request: NavigationRequest) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
    }
}
