use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockflow_allocation::{Batch, OrderLine};
use stockflow_core::{BatchRef, Sku};

use super::r#trait::{BatchRepository, OrderLineRepository};
use crate::error::{StorageError, StorageResult};

/// In-memory order line store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryOrderLineRepository {
    lines: RwLock<Vec<OrderLine>>,
}

impl InMemoryOrderLineRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderLineRepository for InMemoryOrderLineRepository {
    async fn add(&self, line: &OrderLine) -> StorageResult<()> {
        let mut lines = self.lines.write().map_err(|_| StorageError::LockPoisoned)?;
        lines.push(line.clone());
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<OrderLine>> {
        let lines = self.lines.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(lines.clone())
    }
}

/// In-memory batch store keyed by reference.
///
/// Stores clones, so callers mutating a loaded batch must `add` it back.
#[derive(Debug, Default)]
pub struct InMemoryBatchRepository {
    batches: RwLock<BTreeMap<BatchRef, Batch>>,
}

impl InMemoryBatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a repository with existing batches (tests/dev).
    pub fn with_batches(batches: impl IntoIterator<Item = Batch>) -> Self {
        let map = batches
            .into_iter()
            .map(|b| (b.reference().clone(), b))
            .collect();
        Self {
            batches: RwLock::new(map),
        }
    }
}

#[async_trait]
impl BatchRepository for InMemoryBatchRepository {
    async fn add(&self, batch: &Batch) -> StorageResult<()> {
        let mut batches = self.batches.write().map_err(|_| StorageError::LockPoisoned)?;
        batches.insert(batch.reference().clone(), batch.clone());
        Ok(())
    }

    async fn get(&self, reference: &BatchRef) -> StorageResult<Option<Batch>> {
        let batches = self.batches.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(batches.get(reference).cloned())
    }

    async fn list(&self) -> StorageResult<Vec<Batch>> {
        let batches = self.batches.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(batches.values().cloned().collect())
    }

    async fn list_for_sku(&self, sku: &Sku) -> StorageResult<Vec<Batch>> {
        let batches = self.batches.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(batches.values().filter(|b| b.sku() == sku).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockflow_core::OrderId;

    fn line(order_id: &str, sku: &str, qty: i64) -> OrderLine {
        OrderLine::new(OrderId::new(order_id).unwrap(), Sku::new(sku).unwrap(), qty).unwrap()
    }

    fn batch(reference: &str, sku: &str, qty: i64) -> Batch {
        Batch::new(BatchRef::new(reference).unwrap(), Sku::new(sku).unwrap(), qty, None).unwrap()
    }

    #[tokio::test]
    async fn order_lines_list_in_insertion_order() {
        let repo = InMemoryOrderLineRepository::new();
        repo.add(&line("order1", "RED-CHAIR", 12)).await.unwrap();
        repo.add(&line("order1", "RED-TABLE", 13)).await.unwrap();

        let lines = repo.list().await.unwrap();
        assert_eq!(lines, vec![line("order1", "RED-CHAIR", 12), line("order1", "RED-TABLE", 13)]);
    }

    #[tokio::test]
    async fn saved_batch_keeps_its_allocations() {
        let repo = InMemoryBatchRepository::new();
        let mut b = batch("batch1", "LAMP", 10);
        b.allocate(&line("o1", "LAMP", 4));
        repo.add(&b).await.unwrap();

        let loaded = repo.get(b.reference()).await.unwrap().unwrap();
        assert_eq!(loaded.available_quantity(), 6);
        assert!(loaded.is_allocated(&line("o1", "LAMP", 4)));
    }

    #[tokio::test]
    async fn add_replaces_existing_batch_state() {
        let repo = InMemoryBatchRepository::with_batches([batch("batch1", "LAMP", 10)]);
        let mut updated = batch("batch1", "LAMP", 10);
        updated.allocate(&line("o1", "LAMP", 10));
        repo.add(&updated).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].available_quantity(), 0);
    }

    #[tokio::test]
    async fn list_for_sku_filters_batches() {
        let repo = InMemoryBatchRepository::with_batches([
            batch("b1", "LAMP", 1),
            batch("b2", "CHAIR", 1),
            batch("b3", "LAMP", 1),
        ]);
        let lamps = repo.list_for_sku(&Sku::new("LAMP").unwrap()).await.unwrap();
        let refs: Vec<&str> = lamps.iter().map(|b| b.reference().as_str()).collect();
        assert_eq!(refs, vec!["b1", "b3"]);
        assert!(repo.get(&BatchRef::new("missing").unwrap()).await.unwrap().is_none());
    }
}
