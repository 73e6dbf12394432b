//! SessionAuthListener - keeps session state in step with identity events.

use std::sync::Weak;

use async_trait::async_trait;

use crate::domain::session::AuthEvent;
use crate::ports::AuthEventHandler;

use super::session_manager::SessionCore;

/// Handles identity events on behalf of a [`super::SessionManager`].
///
/// Holds a weak reference so a hub that outlives the manager does not keep
/// the session alive; events arriving after that are dropped.
pub(super) struct SessionAuthListener {
    core: Weak<SessionCore>,
}

impl SessionAuthListener {
    pub(super) fn new(core: Weak<SessionCore>) -> Self {
        Self { core }
    }
}

#[async_trait]
impl AuthEventHandler for SessionAuthListener {
    async fn handle(&self, event: AuthEvent) {
        let Some(core) = self.core.upgrade() else {
            return;
        };

        tracing::debug!(event = event.as_str(), "Auth event received");

        match event {
            AuthEvent::SignedIn | AuthEvent::AutoSignedIn | AuthEvent::TokenRefreshed => {
                core.refresh_signed_in_user().await;
            }
            AuthEvent::SignedOut | AuthEvent::UserDeleted => core.set_user(None),
        }
    }

    fn name(&self) -> &'static str {
        "SessionAuthListener"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::adapters::{InMemoryAuthHub, InMemoryCollectionStore, MockIdentityProvider};
    use crate::application::handlers::collection::DefaultCollectionReconciler;
    use crate::application::handlers::session::{SessionManager, SessionSettings};
    use crate::domain::collection::DEFAULT_COLLECTION_NAME;
    use crate::domain::session::AuthEvent;
    use crate::ports::StoreError;

    struct Fixture {
        session: SessionManager,
        identity: Arc<MockIdentityProvider>,
        hub: Arc<InMemoryAuthHub>,
        store: Arc<InMemoryCollectionStore>,
    }

    fn fixture_with_store(store: InMemoryCollectionStore) -> Fixture {
        let hub = Arc::new(InMemoryAuthHub::new());
        let identity = Arc::new(
            MockIdentityProvider::new()
                .with_account("mira@example.com", "correct horse", "user-1")
                .with_event_hub(hub.clone()),
        );
        let store = Arc::new(store);
        let reconciler = Arc::new(DefaultCollectionReconciler::new(store.clone()));
        let session = SessionManager::new(
            identity.clone(),
            hub.clone(),
            reconciler,
            SessionSettings::default(),
        );
        session.start_auth_listener();
        Fixture {
            session,
            identity,
            hub,
            store,
        }
    }

    fn fixture() -> Fixture {
        fixture_with_store(InMemoryCollectionStore::new())
    }

    #[tokio::test]
    async fn external_sign_in_sets_user_and_reconciles() {
        let f = fixture();

        f.identity
            .sign_in_externally("mira@example.com")
            .await
            .unwrap();

        assert_eq!(f.session.current_user().unwrap().user_id.as_str(), "user-1");
        assert_eq!(f.store.named_for("user-1", DEFAULT_COLLECTION_NAME).len(), 1);
    }

    #[tokio::test]
    async fn signed_out_clears_user() {
        let f = fixture();
        f.identity
            .sign_in_externally("mira@example.com")
            .await
            .unwrap();

        f.hub.publish(AuthEvent::SignedOut).await;

        assert!(!f.session.is_authenticated());
    }

    #[tokio::test]
    async fn user_deleted_clears_user() {
        let f = fixture();
        f.identity
            .sign_in_externally("mira@example.com")
            .await
            .unwrap();

        f.hub.publish(AuthEvent::UserDeleted).await;

        assert!(f.session.current_user().is_none());
    }

    #[tokio::test]
    async fn token_refresh_without_session_clears_user() {
        let f = fixture();

        f.hub.publish(AuthEvent::TokenRefreshed).await;

        assert!(f.session.current_user().is_none());
        assert_eq!(f.store.calls().total(), 0);
    }

    #[tokio::test]
    async fn token_refresh_reconciles_again() {
        let f = fixture();
        f.identity
            .sign_in_externally("mira@example.com")
            .await
            .unwrap();
        f.store.reset_calls();

        f.hub.publish(AuthEvent::TokenRefreshed).await;

        let calls = f.store.calls();
        assert_eq!(calls.lists.len(), 1);
        assert_eq!(calls.mutation_count(), 0);
        assert_eq!(f.store.named_for("user-1", DEFAULT_COLLECTION_NAME).len(), 1);
    }

    #[tokio::test]
    async fn reconcile_failure_does_not_block_event() {
        let f = fixture_with_store(
            InMemoryCollectionStore::new().with_create_error(StoreError::unavailable("down")),
        );

        f.identity
            .sign_in_externally("mira@example.com")
            .await
            .unwrap();

        assert!(f.session.is_authenticated());
        assert!(f.session.last_error().is_none());
    }

    #[tokio::test]
    async fn events_after_shutdown_are_not_observed() {
        let f = fixture();
        f.session.shutdown();

        f.identity
            .sign_in_externally("mira@example.com")
            .await
            .unwrap();

        assert!(!f.session.is_authenticated());
    }

    #[tokio::test]
    async fn dropped_session_ignores_events() {
        let Fixture {
            session,
            identity,
            store,
            ..
        } = fixture();
        drop(session);

        identity.sign_in_externally("mira@example.com").await.unwrap();

        assert_eq!(store.calls().total(), 0);
    }
}
