//! Infrastructure layer: configuration, persistence adapters, and the
//! allocation service that ties repositories to the domain.
//!
//! Domain types in `stockflow-allocation` know nothing about storage; the
//! mapping between entities and rows lives entirely in [`repository`].

pub mod config;
pub mod error;
pub mod repository;
pub mod services;

pub use config::DatabaseConfig;
pub use error::{ServiceError, StorageError, StorageResult};
pub use repository::{
    BatchRepository, InMemoryBatchRepository, InMemoryOrderLineRepository, OrderLineRepository,
    SqliteBatchRepository, SqliteOrderLineRepository,
};
