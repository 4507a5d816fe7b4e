//! Local object store.
//!
//! Blobs are kept in an `object_store` backend (filesystem or memory) under
//! `{container}/{blob_name}`. Write credentials are HMAC-SHA256 signed query
//! strings:
//!
//! `se=<expiry unix secs>&sp=cwa&sr=b&sig=base64url(HMAC(key, "<path>\n<se>\n<sp>"))`
//!
//! and are checked by [`LocalBlobStore::put_with_credential`].

use crate::keys::{name_from_path, object_path, url_path};
use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use futures::TryStreamExt;
use hmac::{Hmac, Mac};
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload};
use sha2::Sha256;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Permissions granted by every write credential: create, write, add.
const WRITE_PERMISSIONS: &str = "cwa";

type HmacSha256 = Hmac<Sha256>;

pub struct LocalBlobStore<S = LocalFileSystem> {
    store: S,
    container: String,
    base_url: String,
    signing_key: Vec<u8>,
}

impl LocalBlobStore<LocalFileSystem> {
    /// Filesystem-backed store rooted at `base_path`.
    ///
    /// * `base_url` - URL the directory is served from, e.g. `http://localhost:4000/blobs`
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        container: String,
        signing_key: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        tokio::fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let store = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::with_store(store, base_url, container, signing_key))
    }
}

impl LocalBlobStore<InMemory> {
    /// Memory-backed store, used by tests and throwaway dev servers.
    pub fn in_memory(
        base_url: String,
        container: String,
        signing_key: impl Into<Vec<u8>>,
    ) -> Self {
        Self::with_store(InMemory::new(), base_url, container, signing_key)
    }
}

impl<S: ObjectStore> LocalBlobStore<S> {
    pub fn with_store(
        store: S,
        base_url: String,
        container: String,
        signing_key: impl Into<Vec<u8>>,
    ) -> Self {
        LocalBlobStore {
            store,
            container,
            base_url: base_url.trim_end_matches('/').to_string(),
            signing_key: signing_key.into(),
        }
    }

    fn location(&self, blob_name: &str) -> StorageResult<Path> {
        object_path(Some(&self.container), blob_name)
    }

    fn sign(&self, location: &Path, expiry: u64, permissions: &str) -> StorageResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(string_to_sign(location, expiry, permissions).as_bytes());
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    /// Check a credential previously issued for `blob_name`.
    pub fn verify_write_credential(&self, blob_name: &str, credential: &str) -> StorageResult<()> {
        let location = self.location(blob_name)?;

        let mut expiry = None;
        let mut permissions = None;
        let mut signature = None;
        for pair in credential.trim_start_matches('?').split('&') {
            match pair.split_once('=') {
                Some(("se", value)) => expiry = Some(value),
                Some(("sp", value)) => permissions = Some(value),
                Some(("sig", value)) => signature = Some(value),
                _ => {}
            }
        }

        let invalid = |reason: &str| StorageError::InvalidCredential(reason.to_string());

        let expiry: u64 = expiry
            .ok_or_else(|| invalid("missing expiry"))?
            .parse()
            .map_err(|_| invalid("malformed expiry"))?;
        let permissions = permissions.ok_or_else(|| invalid("missing permissions"))?;
        let signature = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature.ok_or_else(|| invalid("missing signature"))?)
            .map_err(|_| invalid("malformed signature"))?;

        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?;
        mac.update(string_to_sign(&location, expiry, permissions).as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| invalid("signature mismatch"))?;

        if !permissions.contains('c') || !permissions.contains('w') {
            return Err(invalid("credential does not grant write access"));
        }
        if unix_now() > expiry {
            return Err(invalid("credential has expired"));
        }

        Ok(())
    }

    /// Store `data` under `blob_name` if `credential` allows it.
    pub async fn put_with_credential(
        &self,
        blob_name: &str,
        credential: &str,
        data: Bytes,
    ) -> StorageResult<()> {
        self.verify_write_credential(blob_name, credential)?;

        let location = self.location(blob_name)?;
        let size = data.len();
        let start = Instant::now();

        self.store
            .put(&location, PutPayload::from(data))
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::info!(
            container = %self.container,
            blob_name = %blob_name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local upload successful"
        );

        Ok(())
    }
}

fn string_to_sign(location: &Path, expiry: u64, permissions: &str) -> String {
    format!("{}\n{}\n{}", location, expiry, permissions)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[async_trait]
impl<S: ObjectStore> BlobStore for LocalBlobStore<S> {
    fn container(&self) -> &str {
        &self.container
    }

    async fn generate_write_credential(
        &self,
        blob_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = self.location(blob_name)?;
        let expiry = unix_now().saturating_add(expires_in.as_secs());
        let signature = self.sign(&location, expiry, WRITE_PERMISSIONS)?;

        Ok(format!(
            "se={}&sp={}&sr=b&sig={}",
            expiry, WRITE_PERMISSIONS, signature
        ))
    }

    fn public_url(&self, blob_name: &str) -> StorageResult<String> {
        let location = self.location(blob_name)?;
        Ok(format!("{}/{}", self.base_url, url_path(&location)))
    }

    async fn list_names(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let start = Instant::now();
        let location = self.location(prefix)?;

        let objects: Vec<_> = match self.store.list(Some(&location)).try_collect().await {
            Ok(objects) => objects,
            Err(ObjectStoreError::NotFound { .. }) => Vec::new(),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    container = %self.container,
                    prefix = %prefix,
                    "Local list failed"
                );
                return Err(StorageError::ListFailed(e.to_string()));
            }
        };

        let names: Vec<String> = objects
            .into_iter()
            .filter_map(|meta| name_from_path(Some(&self.container), &meta.location))
            .collect();

        tracing::debug!(
            container = %self.container,
            prefix = %prefix,
            count = names.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local list successful"
        );

        Ok(names)
    }

    async fn delete_by_name(&self, blob_name: &str) -> StorageResult<()> {
        let location = self.location(blob_name)?;

        match self.store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => Ok(()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    container = %self.container,
                    blob_name = %blob_name,
                    "Local delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
