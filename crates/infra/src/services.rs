//! Allocation use cases over a batch repository.
//!
//! Each call loads the batches it needs, runs the domain logic and saves what
//! changed. There is no unit of work: concurrent callers racing on the same
//! batches must be serialized by the caller.

use chrono::NaiveDate;
use tracing::instrument;

use stockflow_allocation::{Batch, OrderLine};
use stockflow_core::{BatchRef, Sku};

use crate::error::ServiceError;
use crate::repository::BatchRepository;

/// Register a new batch of stock.
///
/// Fails with `DuplicateBatch` if the reference is already stored; an existing
/// batch's quantity and allocations are never overwritten.
#[instrument(skip(reference, sku, repo), fields(reference = %reference, sku = %sku))]
pub async fn add_batch<R>(
    reference: BatchRef,
    sku: Sku,
    purchased_quantity: i64,
    eta: Option<NaiveDate>,
    repo: &R,
) -> Result<(), ServiceError>
where
    R: BatchRepository + ?Sized,
{
    let batch = Batch::new(reference, sku, purchased_quantity, eta)?;
    if repo.get(batch.reference()).await?.is_some() {
        return Err(ServiceError::DuplicateBatch(batch.reference().clone()));
    }
    repo.add(&batch).await?;
    tracing::info!(purchased_quantity, ?eta, "batch added");
    Ok(())
}

/// Allocate `line` to one of the stored batches for its SKU and persist the
/// chosen batch. Returns the chosen batch reference.
///
/// Fails with `InvalidSku` when no batch stocks the SKU at all and with
/// `Allocation(OutOfStock)` when batches exist but none can take the line.
/// Nothing is written on failure.
#[instrument(
    skip(line, repo),
    fields(order_id = %line.order_id(), sku = %line.sku(), quantity = line.quantity())
)]
pub async fn allocate<R>(line: &OrderLine, repo: &R) -> Result<BatchRef, ServiceError>
where
    R: BatchRepository + ?Sized,
{
    let mut batches = repo.list_for_sku(line.sku()).await?;
    if batches.is_empty() {
        return Err(ServiceError::InvalidSku(line.sku().clone()));
    }

    let chosen = stockflow_allocation::allocate(line, &mut batches)?;

    for batch in batches.iter().filter(|b| b.reference() == &chosen) {
        repo.add(batch).await?;
    }

    tracing::info!(batch = %chosen, "order line allocated");
    Ok(chosen)
}

/// Remove `line` from the referenced batch and persist it.
///
/// Deallocating a line the batch does not hold is a no-op, not an error.
#[instrument(skip(line, repo), fields(order_id = %line.order_id(), batch = %reference))]
pub async fn deallocate<R>(line: &OrderLine, reference: &BatchRef, repo: &R) -> Result<(), ServiceError>
where
    R: BatchRepository + ?Sized,
{
    let mut batch = repo
        .get(reference)
        .await?
        .ok_or_else(|| ServiceError::UnknownBatch(reference.clone()))?;

    batch.deallocate(line);
    repo.add(&batch).await?;
    Ok(())
}
