//! Allocation domain module.
//!
//! This crate contains the business rules for allocating order lines to stock
//! batches, implemented purely as deterministic domain logic (no IO, no
//! storage, no clocks).

pub mod allocator;
pub mod batch;
pub mod error;
pub mod order_line;

pub use allocator::allocate;
pub use batch::{allocation_priority, Batch, BatchSnapshot};
pub use error::AllocationError;
pub use order_line::OrderLine;
