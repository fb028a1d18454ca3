//! Access traits over the primary store.

use async_trait::async_trait;

use cartfeed_core::{Category, CategoryRef, Checkpoint, Item, ItemId, Timestamp};

use crate::error::StoreError;

/// Read access to items and categories.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetch items, optionally pre-filtered to `lastUpdateDate > t`.
    ///
    /// The filter is an optimization and may over-select; the change
    /// detector applies the authoritative per-item test afterwards.
    async fn find_items(&self, updated_after: Option<Timestamp>)
    -> Result<Vec<Item>, StoreError>;

    /// Look up a category by its resolved reference. `Ok(None)` means
    /// not found (as opposed to a store failure).
    async fn find_category(&self, category: &CategoryRef)
    -> Result<Option<Category>, StoreError>;
}

/// Persistence of per-item export checkpoints.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load all checkpoint documents projected to `{_id, lastProcessTs}`.
    async fn load_all(&self) -> Result<Vec<Checkpoint>, StoreError>;

    /// Create-or-overwrite the checkpoint for one item. Idempotent.
    async fn upsert(&self, item_id: &ItemId, ts: &Timestamp) -> Result<(), StoreError>;
}
