//! In-memory stores.
//!
//! Same contracts as the PostgreSQL stores, held in process. Handy for tests
//! and for running the API without a database.

use crate::document::DocumentStore;
use crate::error::DbError;
use crate::metadata::MetadataStore;
use assetsync_core::models::{AssetDocument, AssetRecord, AssetStatus, AssetUpdate, NewAsset};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<Uuid, AssetDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upsert(&self, document: &AssetDocument) -> Result<(), DbError> {
        self.documents
            .write()
            .await
            .insert(document.id, document.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetDocument>, DbError> {
        Ok(self.documents.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        self.documents.write().await.remove(&id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryMetadataStore {
    records: Arc<RwLock<HashMap<Uuid, AssetRecord>>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert(&self, asset: &NewAsset) -> Result<AssetRecord, DbError> {
        let record = AssetRecord {
            id: asset.id,
            user_id: None,
            file_name: asset.file_name.clone(),
            file_type: asset.file_type.clone(),
            file_size: asset.file_size,
            blob_url: asset.blob_url.clone(),
            status: AssetStatus::Pending.as_str().to_string(),
            created_at: Utc::now(),
        };

        let mut records = self.records.write().await;
        if records.contains_key(&asset.id) {
            return Err(DbError::Sqlx(sqlx::Error::Protocol(format!(
                "duplicate key value violates unique constraint: id={}",
                asset.id
            ))));
        }
        records.insert(asset.id, record.clone());

        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetRecord>, DbError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<AssetRecord>, DbError> {
        let mut records: Vec<AssetRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn update(&self, id: Uuid, update: &AssetUpdate) -> Result<u64, DbError> {
        if update.is_empty() {
            return Ok(0);
        }

        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&id) else {
            return Ok(0);
        };

        if let Some(ref file_name) = update.file_name {
            record.file_name = file_name.clone();
        }
        if let Some(ref file_type) = update.file_type {
            record.file_type = file_type.clone();
        }
        if let Some(file_size) = update.file_size {
            record.file_size = file_size;
        }
        if let Some(ref blob_url) = update.blob_url {
            record.blob_url = blob_url.clone();
        }
        if let Some(status) = update.status() {
            record.status = status.to_string();
        }

        Ok(1)
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DbError> {
        Ok(self.records.write().await.remove(&id).map_or(0, |_| 1))
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}
