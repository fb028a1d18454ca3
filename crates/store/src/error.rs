//! Storage error model with a transient/permanent split.

use thiserror::Error;

/// Error code the store uses for an interrupted operation; treated as
/// transient alongside timeouts and connection failures.
pub const INTERRUPTED_OPERATION_CODE: i32 = 50;

/// Primary-store operation error.
///
/// Transient errors are retried by the gateway; permanent errors fail the
/// enclosing item or Run step immediately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connection to the store failed or was dropped.
    #[error("connection failure: {0}")]
    Connection(String),

    /// An operation timed out.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// The store reported an interrupted operation (designated retryable code).
    #[error("interrupted operation (code {code})")]
    Interrupted { code: i32 },

    /// A query was rejected or malformed (not retryable).
    #[error("query failed: {0}")]
    Query(String),

    /// A write was rejected (not retryable).
    #[error("write failed: {0}")]
    Write(String),
}

impl StoreError {
    /// Whether the gateway should retry this error.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Connection(_) | StoreError::Timeout(_) => true,
            StoreError::Interrupted { code } => *code == INTERRUPTED_OPERATION_CODE,
            StoreError::Query(_) | StoreError::Write(_) => false,
        }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn interrupted() -> Self {
        Self::Interrupted {
            code: INTERRUPTED_OPERATION_CODE,
        }
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StoreError::connection("reset").is_transient());
        assert!(StoreError::timeout("find").is_transient());
        assert!(StoreError::interrupted().is_transient());
        assert!(!StoreError::Interrupted { code: 11000 }.is_transient());
        assert!(!StoreError::query("bad filter").is_transient());
        assert!(!StoreError::write("duplicate key").is_transient());
    }
}
