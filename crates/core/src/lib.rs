//! `cartfeed-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the inventory item and category documents as they live in the primary
//! store, the fixed-format export timestamp, and the per-item checkpoint.

pub mod category;
pub mod checkpoint;
pub mod error;
pub mod item;
pub mod timestamp;

pub use category::{Category, CategoryRef, UNKNOWN_CATEGORY};
pub use checkpoint::{Checkpoint, CheckpointMap};
pub use error::{DomainError, DomainResult};
pub use item::{Item, ItemId, ItemPrice, Review, StockDetails};
pub use timestamp::Timestamp;
