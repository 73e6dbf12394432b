//! AuthEventSource port - subscription to identity events.
//!
//! Handlers register once and receive every [`AuthEvent`] until they are
//! unsubscribed with the returned [`SubscriptionId`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::SubscriptionId;
use crate::domain::session::AuthEvent;

/// Handler for identity events.
///
/// Handlers own their error handling: there is nobody to report to.
#[async_trait]
pub trait AuthEventHandler: Send + Sync {
    async fn handle(&self, event: AuthEvent);

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to identity events.
pub trait AuthEventSource: Send + Sync {
    /// Registers `handler` for all identity events.
    fn subscribe(&self, handler: Arc<dyn AuthEventHandler>) -> SubscriptionId;

    /// Removes a subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that traits are object-safe
    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn AuthEventHandler) {}

    #[allow(dead_code)]
    fn assert_source_object_safe(_: &dyn AuthEventSource) {}

    #[test]
    fn auth_event_source_is_send_sync() {
        fn _assert_arc_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_arc_send_sync::<Arc<dyn AuthEventSource>>();
        _assert_arc_send_sync::<Arc<dyn AuthEventHandler>>();
    }
}
