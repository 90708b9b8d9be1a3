//! Common error types for Kith.

use crate::EntityId;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Entity id already in use (restoring over a live entity).
    #[error("Entity already exists: {0}")]
    EntityExists(EntityId),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
