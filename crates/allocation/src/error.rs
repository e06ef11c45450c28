use stockflow_core::Sku;
use thiserror::Error;

/// Outcome of a failed allocation.
///
/// Returned only by [`crate::allocate`]. `Batch::allocate` and
/// `Batch::deallocate` never fail.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// No candidate batch stocks the SKU with enough available quantity.
    #[error("Out of stock for sku {sku}")]
    OutOfStock { sku: Sku },
}

impl AllocationError {
    pub fn out_of_stock(sku: Sku) -> Self {
        Self::OutOfStock { sku }
    }

    /// The SKU that could not be allocated.
    pub fn sku(&self) -> &Sku {
        match self {
            AllocationError::OutOfStock { sku } => sku,
        }
    }
}
