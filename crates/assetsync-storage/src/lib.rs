//! Object storage for asset content.
//!
//! Content blobs live in a single container under `{asset_id}/{file_name}`.
//! The service never moves bytes itself: clients upload straight to the store
//! with a short-lived write credential, and the service only lists and deletes.
//!
//! Two backends implement [`BlobStore`]: S3 (and S3-compatible gateways) with
//! SigV4 presigned PUT credentials, and a local/in-memory store whose
//! credentials are HMAC-signed query strings.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

pub use assetsync_core::StorageBackend;
pub use factory::create_blob_store;
pub use local::LocalBlobStore;
pub use s3::S3BlobStore;
pub use traits::{BlobStore, StorageError, StorageResult};
