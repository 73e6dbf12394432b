//! In-memory collection store for testing.
//!
//! Keeps records in insertion order, assigns ids and creation times like a
//! hosted store would, and records every call for assertions. Failures and
//! latency can be injected to exercise error paths and races.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::collection::{Collection, NewCollection};
use crate::domain::foundation::{CollectionId, Timestamp};
use crate::ports::{CollectionStore, ListCollections, StoreError};

/// In-memory collection store.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
#[derive(Debug, Default)]
pub struct InMemoryCollectionStore {
    records: RwLock<Vec<Collection>>,
    calls: RwLock<StoreCalls>,
    failures: RwLock<Failures>,
    /// Applied before every operation, letting concurrent callers interleave.
    latency: Option<Duration>,
    /// Simulates a store whose `list` ignores the owner filter.
    ignore_owner_filter: bool,
}

/// Calls observed by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreCalls {
    pub lists: Vec<ListCollections>,
    pub creates: Vec<NewCollection>,
    pub deletes: Vec<CollectionId>,
}

impl StoreCalls {
    /// Number of create and delete calls.
    pub fn mutation_count(&self) -> usize {
        self.creates.len() + self.deletes.len()
    }

    pub fn total(&self) -> usize {
        self.lists.len() + self.mutation_count()
    }
}

#[derive(Debug, Default)]
struct Failures {
    list: Option<StoreError>,
    create: Option<StoreError>,
    delete: HashMap<CollectionId, StoreError>,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a stored record.
    pub fn with_collection(self, collection: Collection) -> Self {
        self.records
            .write()
            .expect("InMemoryCollectionStore: records lock poisoned")
            .push(collection);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn ignoring_owner_filter(mut self) -> Self {
        self.ignore_owner_filter = true;
        self
    }

    /// Forces every `list` call to fail.
    pub fn with_list_error(self, error: StoreError) -> Self {
        self.failures
            .write()
            .expect("InMemoryCollectionStore: failures lock poisoned")
            .list = Some(error);
        self
    }

    /// Forces every `create` call to fail.
    pub fn with_create_error(self, error: StoreError) -> Self {
        self.failures
            .write()
            .expect("InMemoryCollectionStore: failures lock poisoned")
            .create = Some(error);
        self
    }

    /// Forces deletion of `id` to fail.
    pub fn with_delete_error(self, id: impl Into<CollectionId>, error: StoreError) -> Self {
        self.failures
            .write()
            .expect("InMemoryCollectionStore: failures lock poisoned")
            .delete
            .insert(id.into(), error);
        self
    }

    /// Clears all injected failures.
    pub fn clear_failures(&self) {
        *self
            .failures
            .write()
            .expect("InMemoryCollectionStore: failures lock poisoned") = Failures::default();
    }

    // === Test Helpers ===

    pub fn collections(&self) -> Vec<Collection> {
        self.records
            .read()
            .expect("InMemoryCollectionStore: records lock poisoned")
            .clone()
    }

    /// Stored records owned by `user` whose name equals `name`.
    pub fn named_for(&self, user: &str, name: &str) -> Vec<Collection> {
        self.collections()
            .into_iter()
            .filter(|c| c.user == user && c.name() == name)
            .collect()
    }

    pub fn calls(&self) -> StoreCalls {
        self.calls
            .read()
            .expect("InMemoryCollectionStore: calls lock poisoned")
            .clone()
    }

    /// Forgets recorded calls, keeping records.
    pub fn reset_calls(&self) {
        *self
            .calls
            .write()
            .expect("InMemoryCollectionStore: calls lock poisoned") = StoreCalls::default();
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn list(&self, query: ListCollections) -> Result<Vec<Collection>, StoreError> {
        self.calls
            .write()
            .expect("InMemoryCollectionStore: calls lock poisoned")
            .lists
            .push(query.clone());
        self.delay().await;

        if let Some(error) = self
            .failures
            .read()
            .expect("InMemoryCollectionStore: failures lock poisoned")
            .list
            .clone()
        {
            return Err(error);
        }

        let owner = query
            .owner
            .as_ref()
            .filter(|_| !self.ignore_owner_filter);

        Ok(self
            .records
            .read()
            .expect("InMemoryCollectionStore: records lock poisoned")
            .iter()
            .filter(|c| owner.map_or(true, |owner| c.user == owner.as_str()))
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, collection: NewCollection) -> Result<Collection, StoreError> {
        self.calls
            .write()
            .expect("InMemoryCollectionStore: calls lock poisoned")
            .creates
            .push(collection.clone());
        self.delay().await;

        if let Some(error) = self
            .failures
            .read()
            .expect("InMemoryCollectionStore: failures lock poisoned")
            .create
            .clone()
        {
            return Err(error);
        }

        let record = Collection {
            id: CollectionId::new(Uuid::new_v4().to_string()),
            user: collection.user.as_str().to_string(),
            property: collection.property,
            created_at: Some(Timestamp::now().to_rfc3339()),
        };
        self.records
            .write()
            .expect("InMemoryCollectionStore: records lock poisoned")
            .push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &CollectionId) -> Result<(), StoreError> {
        self.calls
            .write()
            .expect("InMemoryCollectionStore: calls lock poisoned")
            .deletes
            .push(id.clone());
        self.delay().await;

        if let Some(error) = self
            .failures
            .read()
            .expect("InMemoryCollectionStore: failures lock poisoned")
            .delete
            .get(id)
            .cloned()
        {
            return Err(error);
        }

        let mut records = self
            .records
            .write()
            .expect("InMemoryCollectionStore: records lock poisoned");
        let before = records.len();
        records.retain(|c| &c.id != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collection::CollectionProperty;
    use crate::domain::foundation::UserId;

    fn record(id: &str, user: &str) -> Collection {
        Collection {
            id: CollectionId::new(id),
            user: user.to_string(),
            property: CollectionProperty::named("Room"),
            created_at: None,
        }
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn list_applies_owner_filter_and_limit() {
        let store = InMemoryCollectionStore::new()
            .with_collection(record("a", "u1"))
            .with_collection(record("b", "u2"))
            .with_collection(record("c", "u1"))
            .with_collection(record("d", "u1"));

        let listed = store
            .list(ListCollections::owned_by(user("u1"), 2))
            .await
            .unwrap();

        let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn list_can_ignore_owner_filter() {
        let store = InMemoryCollectionStore::new()
            .with_collection(record("a", "u1"))
            .with_collection(record("b", "u2"))
            .ignoring_owner_filter();

        let listed = store
            .list(ListCollections::owned_by(user("u1"), 10))
            .await
            .unwrap();

        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamp() {
        let store = InMemoryCollectionStore::new();

        let created = store
            .create(NewCollection::default_for(user("u1"), "Room"))
            .await
            .unwrap();

        assert!(!created.id.is_blank());
        assert_eq!(created.user, "u1");
        assert!(created.created_at.is_some());
        assert_eq!(store.collections(), vec![created]);
        assert_eq!(store.calls().creates.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryCollectionStore::new().with_collection(record("a", "u1"));

        store.delete(&CollectionId::new("a")).await.unwrap();

        assert!(store.collections().is_empty());
        assert_eq!(store.calls().deletes, vec![CollectionId::new("a")]);
    }

    #[tokio::test]
    async fn delete_unknown_returns_not_found() {
        let store = InMemoryCollectionStore::new();

        let result = store.delete(&CollectionId::new("missing")).await;

        assert_eq!(result, Err(StoreError::NotFound(CollectionId::new("missing"))));
    }

    #[tokio::test]
    async fn injected_failures_are_returned() {
        let store = InMemoryCollectionStore::new()
            .with_collection(record("a", "u1"))
            .with_list_error(StoreError::unavailable("down"))
            .with_create_error(StoreError::rejected("nope"))
            .with_delete_error("a", StoreError::unavailable("flaky"));

        assert!(store.list(ListCollections::owned_by(user("u1"), 1)).await.is_err());
        assert!(store
            .create(NewCollection::default_for(user("u1"), "Room"))
            .await
            .is_err());
        assert!(store.delete(&CollectionId::new("a")).await.is_err());
        assert_eq!(store.collections().len(), 1);

        store.clear_failures();
        assert!(store.delete(&CollectionId::new("a")).await.is_ok());
    }

    #[tokio::test]
    async fn calls_can_be_reset() {
        let store = InMemoryCollectionStore::new();
        store
            .list(ListCollections::owned_by(user("u1"), 1))
            .await
            .unwrap();
        assert_eq!(store.calls().total(), 1);

        store.reset_calls();

        assert_eq!(store.calls(), StoreCalls::default());
    }
}
