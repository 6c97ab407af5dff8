//! DAO error model.

use thiserror::Error;

/// Result type used across the DAO layers.
pub type DaoResult<T> = Result<T, DaoError>;

/// DAO-level error.
///
/// Absence is not an error: single-result reads, takes, polls and peeks that
/// find nothing (including a wait that reaches its deadline) resolve to
/// `Ok(None)`. Everything here is fatal to the failing call only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DaoError {
    /// A predicate query could not be parsed, referenced an unknown field, or
    /// had a placeholder/parameter count mismatch.
    #[error("malformed query: {0}")]
    MalformedQuery(String),

    /// A bounded store stayed full past the write timeout.
    #[error("store capacity exceeded (capacity: {capacity})")]
    CapacityExceeded { capacity: usize },

    /// Internal storage failure (e.g. lock poisoning).
    #[error("storage error: {0}")]
    Storage(String),

    /// A configuration value was missing or invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DaoError {
    pub fn malformed_query(msg: impl Into<String>) -> Self {
        Self::MalformedQuery(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn capacity_exceeded(capacity: usize) -> Self {
        Self::CapacityExceeded { capacity }
    }

    /// Error used when an internal lock was poisoned by a panicking holder.
    pub fn poisoned() -> Self {
        Self::Storage("lock poisoned".to_string())
    }
}
