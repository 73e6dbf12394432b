//! In-memory identity event hub.
//!
//! Delivers events to subscribers in registration order, awaiting each
//! handler in turn. Used in tests and as the local fan-out point when an
//! identity adapter produces events itself.
//!
//! # Security Note
//!
//! It uses `.expect()` on lock operations which will panic if locks are
//! poisoned. Handlers are always invoked with the locks released.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::foundation::SubscriptionId;
use crate::domain::session::AuthEvent;
use crate::ports::{AuthEventHandler, AuthEventSource};

/// In-memory identity event hub.
///
/// # Example
///
/// ```ignore
/// let hub = Arc::new(InMemoryAuthHub::new());
/// let id = hub.subscribe(listener);
///
/// hub.publish(AuthEvent::SignedIn).await;
/// assert!(hub.has_event(AuthEvent::SignedIn));
///
/// hub.unsubscribe(id);
/// ```
pub struct InMemoryAuthHub {
    handlers: RwLock<Vec<(SubscriptionId, Arc<dyn AuthEventHandler>)>>,
    published: RwLock<Vec<AuthEvent>>,
    next_id: AtomicU64,
}

impl InMemoryAuthHub {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            published: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Delivers `event` to every current subscriber.
    pub async fn publish(&self, event: AuthEvent) {
        self.published
            .write()
            .expect("InMemoryAuthHub: published write lock poisoned")
            .push(event);

        // Clone handlers to release lock before await points
        let handlers: Vec<Arc<dyn AuthEventHandler>> = self
            .handlers
            .read()
            .expect("InMemoryAuthHub: handlers lock poisoned")
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            tracing::debug!(event = event.as_str(), handler = handler.name(), "Delivering auth event");
            handler.handle(event).await;
        }
    }

    // === Test Helpers ===

    /// Returns all published events in order.
    pub fn published_events(&self) -> Vec<AuthEvent> {
        self.published
            .read()
            .expect("InMemoryAuthHub: published lock poisoned")
            .clone()
    }

    pub fn has_event(&self, event: AuthEvent) -> bool {
        self.published
            .read()
            .expect("InMemoryAuthHub: published lock poisoned")
            .contains(&event)
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .read()
            .expect("InMemoryAuthHub: handlers lock poisoned")
            .len()
    }
}

impl Default for InMemoryAuthHub {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEventSource for InMemoryAuthHub {
    fn subscribe(&self, handler: Arc<dyn AuthEventHandler>) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .expect("InMemoryAuthHub: handlers write lock poisoned")
            .push((id, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers
            .write()
            .expect("InMemoryAuthHub: handlers write lock poisoned")
            .retain(|(existing, _)| *existing != id);
    }
}
