//! Error types for the Jarvis knowledge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// Failures raised by a [`KnowledgeStore`](crate::KnowledgeStore).
///
/// The context builder never wraps these: whatever the store returns is
/// what its caller sees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The backing persistence could not be reached or opened.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// An upsert was rejected because required fields are missing.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

impl StoreError {
    /// True when the failure was caused by the caller's input rather than
    /// by the store itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
