//! Per-item export checkpoints.
//!
//! One checkpoint per item: the timestamp of its last successful export.
//! Created on first successful export, overwritten (upserted) on every
//! subsequent one. Absence means "never exported".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::item::ItemId;
use crate::timestamp::Timestamp;

/// Raw checkpoint document as stored (`{_id, lastProcessTs}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(rename = "_id")]
    pub item_id: ItemId,
    /// Raw wire string; parsed when the map snapshot is built.
    #[serde(rename = "lastProcessTs")]
    pub last_process_ts: String,
}

impl Checkpoint {
    pub fn new(item_id: impl Into<String>, last_process_ts: impl Into<String>) -> Self {
        Self {
            item_id: ItemId::new(item_id),
            last_process_ts: last_process_ts.into(),
        }
    }
}

/// Parsed checkpoint snapshot for one Run. Immutable for the Run's duration;
/// commits write new store entries but never mutate the snapshot.
pub type CheckpointMap = HashMap<ItemId, Timestamp>;
