//! Object store abstraction
//!
//! The asset workflows only need four things from object storage: a write
//! credential for a not-yet-existing blob, its public URL, and list/delete by
//! name prefix. The container is fixed when a backend is built.

use crate::StorageBackend;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Credential signing failed: {0}")]
    SigningFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid blob name: {0}")]
    InvalidKey(String),

    #[error("Invalid write credential: {0}")]
    InvalidCredential(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Container (bucket) every blob name is resolved against
    fn container(&self) -> &str;

    /// Issue a credential that allows create/write/add on `blob_name` only,
    /// valid for `expires_in`. The result is a URL query string without the
    /// leading `?`.
    async fn generate_write_credential(
        &self,
        blob_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Deterministic public URL of `blob_name`. Does not touch the network.
    fn public_url(&self, blob_name: &str) -> StorageResult<String>;

    /// Names of every blob starting with `prefix`. An empty result is not an error.
    async fn list_names(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Delete one blob. Deleting a blob that is already gone succeeds.
    async fn delete_by_name(&self, blob_name: &str) -> StorageResult<()>;

    fn backend_type(&self) -> StorageBackend;
}
