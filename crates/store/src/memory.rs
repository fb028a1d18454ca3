//! In-memory store for tests and embedded use.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use cartfeed_core::{Category, CategoryRef, Checkpoint, Item, ItemId, Timestamp};

use crate::error::StoreError;
use crate::traits::{CheckpointStore, ItemStore};

#[derive(Default)]
struct Inner {
    items: Vec<Item>,
    categories: HashMap<CategoryRef, Category>,
    checkpoints: HashMap<ItemId, String>,
    /// Scripted failures, consumed one per store operation.
    fail_queue: VecDeque<StoreError>,
    /// Last `updated_after` bound passed to `find_items` (test observability).
    last_filter: Option<Option<Timestamp>>,
}

/// Mutex-backed in-memory implementation of both store traits.
///
/// Failures can be scripted with [`InMemoryStore::fail_next`]: each queued
/// error fails exactly one subsequent operation, which lets tests exercise
/// the retry gateway and partial-failure paths deterministically.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_item(&self, item: Item) {
        self.lock().items.push(item);
    }

    pub fn insert_category(&self, reference: CategoryRef, category: Category) {
        self.lock().categories.insert(reference, category);
    }

    pub fn insert_checkpoint(&self, checkpoint: Checkpoint) {
        self.lock()
            .checkpoints
            .insert(checkpoint.item_id.clone(), checkpoint.last_process_ts);
    }

    /// Queue an error; the next store operation will fail with it.
    pub fn fail_next(&self, error: StoreError) {
        self.lock().fail_queue.push_back(error);
    }

    /// Checkpoint currently stored for an item, if any.
    pub fn checkpoint_for(&self, item_id: &ItemId) -> Option<String> {
        self.lock().checkpoints.get(item_id).cloned()
    }

    /// The `updated_after` bound passed to the most recent `find_items` call.
    pub fn last_item_filter(&self) -> Option<Option<Timestamp>> {
        self.lock().last_filter
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_scripted_failure(&self) -> Option<StoreError> {
        self.lock().fail_queue.pop_front()
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn find_items(
        &self,
        updated_after: Option<Timestamp>,
    ) -> Result<Vec<Item>, StoreError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        let mut inner = self.lock();
        inner.last_filter = Some(updated_after);
        // The bound is advisory; over-selecting is permitted, and the change
        // detector applies the authoritative per-item test. An in-memory scan
        // gains nothing from pre-filtering, so everything is returned.
        Ok(inner.items.clone())
    }

    async fn find_category(
        &self,
        category: &CategoryRef,
    ) -> Result<Option<Category>, StoreError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        Ok(self.lock().categories.get(category).cloned())
    }
}

#[async_trait]
impl CheckpointStore for InMemoryStore {
    async fn load_all(&self) -> Result<Vec<Checkpoint>, StoreError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        Ok(self
            .lock()
            .checkpoints
            .iter()
            .map(|(id, ts)| Checkpoint {
                item_id: id.clone(),
                last_process_ts: ts.clone(),
            })
            .collect())
    }

    async fn upsert(&self, item_id: &ItemId, ts: &Timestamp) -> Result<(), StoreError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        self.lock()
            .checkpoints
            .insert(item_id.clone(), ts.format());
        Ok(())
    }
}
