//! `cartfeed-store`: primary-store boundary.
//!
//! The concrete document-store driver is out of scope; this crate defines
//! the access traits the pipeline depends on, a retrying gateway that wraps
//! any implementation with transient-error backoff, and an in-memory store
//! for tests and embedded use.

pub mod error;
pub mod gateway;
pub mod memory;
pub mod retry;
pub mod traits;

pub use error::StoreError;
pub use gateway::RetryingStore;
pub use memory::InMemoryStore;
pub use retry::{RetrySchedule, retry};
pub use traits::{CheckpointStore, ItemStore};
