//! assetsync core library
//!
//! Domain models, error types and configuration shared by the storage, db and
//! api crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AuthFailure, ErrorMetadata, LogLevel, StoreKind};
pub use storage_types::StorageBackend;
