//! Persistence for the asset catalog.
//!
//! Two stores hold a copy of every asset: a schemaless document store (JSONB
//! rows in `asset_documents`) and the relational `file_metadata` table. Both
//! are reached through traits so the workflows can run against PostgreSQL or
//! the in-memory implementations enabled by the `memory` feature.

pub mod document;
pub mod error;
pub mod handle;
#[cfg(feature = "memory")]
pub mod memory;
pub mod metadata;

pub use document::{DocumentStore, PgDocumentStore};
pub use error::DbError;
pub use handle::{DatabaseHandle, PoolSettings};
#[cfg(feature = "memory")]
pub use memory::{InMemoryDocumentStore, InMemoryMetadataStore};
pub use metadata::{MetadataStore, PgMetadataStore};
