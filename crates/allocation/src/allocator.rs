//! Batch selection for a single order line.

use stockflow_core::BatchRef;

use crate::batch::{allocation_priority, Batch};
use crate::error::AllocationError;
use crate::order_line::OrderLine;

/// Allocate `line` to the best candidate batch and return its reference.
///
/// Candidates are ranked with [`allocation_priority`] (stock in hand first,
/// then earliest eta; ties keep their input order) and the first batch that
/// [`Batch::can_allocate`] the line receives it. The caller's collection is
/// not reordered.
///
/// Exactly one batch is mutated on success. If nothing qualifies (no
/// candidates, no SKU match, or not enough stock anywhere) the result is
/// [`AllocationError::OutOfStock`] and no batch is touched. Lines are never
/// split across batches.
pub fn allocate<'a, I>(line: &OrderLine, batches: I) -> Result<BatchRef, AllocationError>
where
    I: IntoIterator<Item = &'a mut Batch>,
{
    let mut candidates: Vec<&mut Batch> = batches.into_iter().collect();
    candidates.sort_by(|a, b| allocation_priority(a, b));

    let Some(batch) = candidates.into_iter().find(|b| b.can_allocate(line)) else {
        tracing::debug!(
            order_id = %line.order_id(),
            sku = %line.sku(),
            quantity = line.quantity(),
            "no batch can satisfy order line"
        );
        return Err(AllocationError::out_of_stock(line.sku().clone()));
    };

    batch.allocate(line);
    tracing::debug!(
        order_id = %line.order_id(),
        sku = %line.sku(),
        quantity = line.quantity(),
        batch = %batch.reference(),
        available = batch.available_quantity(),
        "order line allocated"
    );

    Ok(batch.reference().clone())
}
