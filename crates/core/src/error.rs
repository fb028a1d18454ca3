//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic data-shape failures. Infrastructure
/// concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A timestamp did not match the `yyyy-MM-dd HH:mm:ss` wire format.
    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),
}

impl DomainError {
    pub fn malformed_timestamp(value: impl Into<String>) -> Self {
        Self::MalformedTimestamp(value.into())
    }
}
