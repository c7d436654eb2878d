//! Domain error types.

use store::StoreError;
use thiserror::Error;

/// Errors that can occur during lookup operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The requested entity does not exist.
    #[error("No {entity} with id {id} found")]
    NotFound { entity: &'static str, id: i64 },
}

impl DomainError {
    /// Returns true if the error is an operational failure rather than a
    /// missing entity.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, DomainError::Store(err) if err.is_infrastructure())
    }
}
