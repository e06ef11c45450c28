use async_trait::async_trait;

use stockflow_allocation::{Batch, OrderLine};
use stockflow_core::{BatchRef, Sku};

use crate::error::StorageResult;

/// Store of order lines treated purely as value records.
///
/// Implementations must:
/// - persist every `add` as a new record (duplicates are allowed; the store
///   has no notion of line identity)
/// - return lines from `list` in insertion order
#[async_trait]
pub trait OrderLineRepository: Send + Sync {
    /// Persist a newly constructed order line.
    async fn add(&self, line: &OrderLine) -> StorageResult<()>;

    /// Materialize every stored order line.
    async fn list(&self) -> StorageResult<Vec<OrderLine>>;
}

/// Store of batches, reconstituted with their allocation sets.
///
/// Implementations must:
/// - key batches by `reference`; `add` on an existing reference replaces the
///   stored state (quantities, eta and allocation set)
/// - return batches whose allocation sets match what was saved
#[async_trait]
pub trait BatchRepository: Send + Sync {
    /// Insert or replace a batch.
    async fn add(&self, batch: &Batch) -> StorageResult<()>;

    /// Load one batch by reference.
    async fn get(&self, reference: &BatchRef) -> StorageResult<Option<Batch>>;

    /// Load every batch, ordered by reference.
    async fn list(&self) -> StorageResult<Vec<Batch>>;

    /// Load the batches stocking `sku`, ordered by reference.
    async fn list_for_sku(&self, sku: &Sku) -> StorageResult<Vec<Batch>>;
}
