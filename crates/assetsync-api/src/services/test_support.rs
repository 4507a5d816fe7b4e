//! Store doubles that count calls and can be told to fail.

use assetsync_db::{
    DbError, DocumentStore, InMemoryDocumentStore, InMemoryMetadataStore, MetadataStore,
};
use assetsync_core::models::{AssetDocument, AssetRecord, AssetUpdate, NewAsset};
use assetsync_storage::{BlobStore, StorageBackend, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
pub struct Calls {
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub credentials: AtomicUsize,
    /// When set, every call fails after being counted
    pub fail: AtomicBool,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
            + self.writes.load(Ordering::SeqCst)
            + self.credentials.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<(), DbError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()
    }

    fn write(&self) -> Result<(), DbError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()
    }

    fn check(&self) -> Result<(), DbError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockBlobs {
    names: Mutex<BTreeSet<String>>,
    pub calls: Calls,
}

impl MockBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a client uploaded `name`.
    pub fn insert(&self, name: &str) {
        self.names.lock().unwrap().insert(name.to_string());
    }

    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().iter().cloned().collect()
    }

    fn check(&self) -> StorageResult<()> {
        if self.calls.fail.load(Ordering::SeqCst) {
            return Err(StorageError::ListFailed("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MockBlobs {
    fn container(&self) -> &str {
        "assets"
    }

    async fn generate_write_credential(
        &self,
        blob_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.calls.credentials.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(format!(
            "sp=cwa&se={}&sig=mock-{}",
            expires_in.as_secs(),
            blob_name.len()
        ))
    }

    fn public_url(&self, blob_name: &str) -> StorageResult<String> {
        Ok(format!("https://acct.example/assets/{}", blob_name))
    }

    async fn list_names(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.calls.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .names
            .lock()
            .unwrap()
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn delete_by_name(&self, blob_name: &str) -> StorageResult<()> {
        self.calls.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.names.lock().unwrap().remove(blob_name);
        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[derive(Default)]
pub struct MockDocuments {
    pub inner: InMemoryDocumentStore,
    pub calls: Calls,
}

impl MockDocuments {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MockDocuments {
    async fn upsert(&self, document: &AssetDocument) -> Result<(), DbError> {
        self.calls.write()?;
        self.inner.upsert(document).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetDocument>, DbError> {
        self.calls.read()?;
        self.inner.get(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        self.calls.write()?;
        self.inner.delete(id).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.calls.check()
    }
}

#[derive(Default)]
pub struct MockMetadata {
    pub inner: InMemoryMetadataStore,
    pub calls: Calls,
}

impl MockMetadata {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MockMetadata {
    async fn insert(&self, asset: &NewAsset) -> Result<AssetRecord, DbError> {
        self.calls.write()?;
        self.inner.insert(asset).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetRecord>, DbError> {
        self.calls.read()?;
        self.inner.get(id).await
    }

    async fn list(&self) -> Result<Vec<AssetRecord>, DbError> {
        self.calls.read()?;
        self.inner.list().await
    }

    async fn update(&self, id: Uuid, update: &AssetUpdate) -> Result<u64, DbError> {
        self.calls.write()?;
        self.inner.update(id, update).await
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DbError> {
        self.calls.write()?;
        self.inner.delete(id).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.calls.check()
    }
}
