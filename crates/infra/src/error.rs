//! Infrastructure and service error types.

use thiserror::Error;

use stockflow_allocation::AllocationError;
use stockflow_core::{BatchRef, DomainError, Sku};

/// Result type for repository operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-specific errors.
///
/// These are **infrastructure errors** as opposed to allocation outcomes:
/// an `OutOfStock` never surfaces here.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database driver reported a failure (connection, SQL, decode).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored record could not be turned back into a valid domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// An in-memory store's lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

impl From<DomainError> for StorageError {
    fn from(err: DomainError) -> Self {
        StorageError::Corrupt(err.to_string())
    }
}

/// Errors returned by [`crate::services`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No stored batch carries the SKU at all.
    #[error("Invalid sku {0}")]
    InvalidSku(Sku),

    /// Batches exist for the SKU but none can take the line.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// The referenced batch does not exist.
    #[error("unknown batch {0}")]
    UnknownBatch(BatchRef),

    /// A batch with this reference is already stored.
    #[error("batch {0} already exists")]
    DuplicateBatch(BatchRef),

    /// Input failed domain validation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
