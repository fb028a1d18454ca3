//! Retrying decorator over any store implementation.

use std::sync::Arc;

use async_trait::async_trait;

use cartfeed_core::{Category, CategoryRef, Checkpoint, Item, ItemId, Timestamp};

use crate::error::StoreError;
use crate::retry::{RetrySchedule, retry};
use crate::traits::{CheckpointStore, ItemStore};

/// Wraps a store so that every read and write goes through one retry policy.
///
/// This is the single cross-cutting place where transient-error backoff is
/// applied; call sites never duplicate retry loops.
#[derive(Clone)]
pub struct RetryingStore<S> {
    inner: Arc<S>,
    schedule: RetrySchedule,
}

impl<S> RetryingStore<S> {
    pub fn new(inner: Arc<S>, schedule: RetrySchedule) -> Self {
        Self { inner, schedule }
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }
}

#[async_trait]
impl<S: ItemStore> ItemStore for RetryingStore<S> {
    async fn find_items(
        &self,
        updated_after: Option<Timestamp>,
    ) -> Result<Vec<Item>, StoreError> {
        retry(&self.schedule, || self.inner.find_items(updated_after)).await
    }

    async fn find_category(
        &self,
        category: &CategoryRef,
    ) -> Result<Option<Category>, StoreError> {
        retry(&self.schedule, || self.inner.find_category(category)).await
    }
}

#[async_trait]
impl<S: CheckpointStore> CheckpointStore for RetryingStore<S> {
    async fn load_all(&self) -> Result<Vec<Checkpoint>, StoreError> {
        retry(&self.schedule, || self.inner.load_all()).await
    }

    async fn upsert(&self, item_id: &ItemId, ts: &Timestamp) -> Result<(), StoreError> {
        retry(&self.schedule, || self.inner.upsert(item_id, ts)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::memory::InMemoryStore;

    fn fast_schedule() -> RetrySchedule {
        RetrySchedule::new(3, vec![Duration::from_millis(1)])
    }

    #[tokio::test]
    async fn retries_transient_find_failures() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_item(Item::new("a"));
        store.fail_next(StoreError::timeout("find"));
        store.fail_next(StoreError::connection("reset"));

        let gateway = RetryingStore::new(store, fast_schedule());
        let items = gateway.find_items(None).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn permanent_upsert_failure_propagates() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_next(StoreError::write("rejected"));

        let gateway = RetryingStore::new(store, fast_schedule());
        let err = gateway
            .upsert(&ItemId::new("a"), &Timestamp::parse("2024-01-01 00:00:00").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::write("rejected"));
    }
}
