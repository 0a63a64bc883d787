//! Storage error types

use thiserror::Error;

/// Errors surfaced by a [`crate::PipelineStore`] implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
        /// Identifier that was not found
        id: u64,
    },

    /// Opaque failure from the backing store, passed through unchanged
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Create a storage failure
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Whether this error reports a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
