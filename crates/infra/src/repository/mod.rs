//! Persistence boundary for order lines and batches.
//!
//! The domain crate has no storage annotations; each adapter here maps
//! entities to and from its own representation. Row identifiers (autoincrement
//! `id` columns) stay inside the adapters and never reach domain equality.

pub mod in_memory;
pub mod schema;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::{InMemoryBatchRepository, InMemoryOrderLineRepository};
pub use schema::migrate;
pub use sqlite::{SqliteBatchRepository, SqliteOrderLineRepository};
pub use r#trait::{BatchRepository, OrderLineRepository};
