//! Asset workflows across the object, document and relational stores.
//!
//! Each workflow calls the stores one after another in a fixed order and stops
//! at the first failure. Nothing already written is undone: a failure part way
//! through leaves the stores divergent, and the error names the store that
//! failed. Create, for example, can leave a document with no relational row.

use assetsync_core::models::{
    AssetDocument, AssetUpdate, AssetView, CreateAssetRequest, CreateAssetResponse,
    DeleteAssetResponse, NewAsset,
};
use assetsync_core::{AppError, StoreKind};
use assetsync_db::{DbError, DocumentStore, MetadataStore};
use assetsync_storage::{keys, BlobStore};
use chrono::Utc;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone)]
pub struct AssetService {
    blobs: Arc<dyn BlobStore>,
    documents: Arc<dyn DocumentStore>,
    metadata: Arc<dyn MetadataStore>,
    upload_ttl: Duration,
}

/// Log a failed store call and convert it.
fn upstream(store: StoreKind, asset_id: Uuid, step: &'static str, err: impl Display) -> AppError {
    tracing::error!(
        asset_id = %asset_id,
        store = %store,
        step = step,
        error = %err,
        "Store call failed; earlier writes in this request are not rolled back"
    );
    AppError::upstream(store, err)
}

impl AssetService {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        documents: Arc<dyn DocumentStore>,
        metadata: Arc<dyn MetadataStore>,
        upload_ttl: Duration,
    ) -> Self {
        Self {
            blobs,
            documents,
            metadata,
            upload_ttl,
        }
    }

    /// Register a new asset and hand back where to upload its content.
    ///
    /// Order: credential, document upsert, relational insert.
    pub async fn create(&self, request: &CreateAssetRequest) -> Result<CreateAssetResponse, AppError> {
        let (file_name, file_type, file_size) = request.validate()?;

        let id = Uuid::new_v4();
        let blob_name = keys::blob_name(id, &file_name);
        let blob_url = self
            .blobs
            .public_url(&blob_name)
            .map_err(|e| upstream(StoreKind::Object, id, "public_url", e))?;

        let credential = self
            .blobs
            .generate_write_credential(&blob_name, self.upload_ttl)
            .await
            .map_err(|e| upstream(StoreKind::Object, id, "generate_write_credential", e))?;

        let asset = NewAsset {
            id,
            file_name,
            file_type,
            file_size,
            blob_url,
        };

        self.documents
            .upsert(&AssetDocument::from_new(&asset, Utc::now()))
            .await
            .map_err(|e| upstream(StoreKind::Document, id, "upsert", e))?;

        self.metadata
            .insert(&asset)
            .await
            .map_err(|e| upstream(StoreKind::Relational, id, "insert", e))?;

        tracing::info!(
            asset_id = %id,
            blob_name = %blob_name,
            file_size = asset.file_size,
            "Asset created"
        );

        let upload_url = format!("{}?{}", asset.blob_url, credential);
        Ok(CreateAssetResponse {
            id,
            blob_url: asset.blob_url,
            upload_url,
        })
    }

    /// Both copies merged, relational fields on top.
    pub async fn get(&self, id: Uuid) -> Result<AssetView, AppError> {
        let document = self
            .documents
            .get(id)
            .await
            .map_err(|e| upstream(StoreKind::Document, id, "get", e))?;

        let record = self
            .metadata
            .get(id)
            .await
            .map_err(|e| upstream(StoreKind::Relational, id, "get", e))?;

        if document.is_some() != record.is_some() {
            tracing::warn!(
                asset_id = %id,
                in_document_store = document.is_some(),
                in_relational_store = record.is_some(),
                "Asset present in only one store"
            );
        }

        AssetView::merge(document, record)
            .ok_or_else(|| AppError::NotFound("Not Found".to_string()))
    }

    /// Relational rows, newest first.
    pub async fn list(&self) -> Result<Vec<AssetView>, AppError> {
        let records = self.metadata.list().await.map_err(|err: DbError| {
            tracing::error!(store = %StoreKind::Relational, error = %err, "List failed");
            AppError::upstream(StoreKind::Relational, err)
        })?;

        Ok(records.into_iter().map(AssetView::from).collect())
    }

    /// Apply a partial update to both stores.
    ///
    /// The document is always rewritten, even for an empty update. The
    /// relational row is only touched when the update carries a field. The
    /// result is the document as written; it is not re-read from the
    /// relational store.
    pub async fn update(&self, id: Uuid, update: &AssetUpdate) -> Result<AssetDocument, AppError> {
        update.validate()?;

        let mut document = self
            .documents
            .get(id)
            .await
            .map_err(|e| upstream(StoreKind::Document, id, "get", e))?
            .unwrap_or_else(|| AssetDocument::empty(id));

        document.apply(update);

        self.documents
            .upsert(&document)
            .await
            .map_err(|e| upstream(StoreKind::Document, id, "upsert", e))?;

        if update.is_empty() {
            tracing::debug!(asset_id = %id, "No relational fields to update");
        } else {
            let rows = self
                .metadata
                .update(id, update)
                .await
                .map_err(|e| upstream(StoreKind::Relational, id, "update", e))?;

            if rows == 0 {
                tracing::warn!(asset_id = %id, "Update matched no relational row");
            }
        }

        tracing::info!(asset_id = %id, status = ?update.status(), "Asset updated");
        Ok(document)
    }

    /// Remove content blobs, then the relational row, then the document.
    /// Missing pieces are not an error.
    pub async fn delete(&self, id: Uuid) -> Result<DeleteAssetResponse, AppError> {
        let prefix = keys::asset_prefix(id);
        let blob_names = self
            .blobs
            .list_names(&prefix)
            .await
            .map_err(|e| upstream(StoreKind::Object, id, "list_names", e))?;

        for blob_name in &blob_names {
            self.blobs
                .delete_by_name(blob_name)
                .await
                .map_err(|e| upstream(StoreKind::Object, id, "delete_by_name", e))?;
        }

        let rows = self
            .metadata
            .delete(id)
            .await
            .map_err(|e| upstream(StoreKind::Relational, id, "delete", e))?;

        self.documents
            .delete(id)
            .await
            .map_err(|e| upstream(StoreKind::Document, id, "delete", e))?;

        tracing::info!(
            asset_id = %id,
            blobs_deleted = blob_names.len(),
            rows_deleted = rows,
            "Asset deleted"
        );

        Ok(DeleteAssetResponse { deleted: true, id })
    }

    pub async fn ping_documents(&self) -> Result<(), DbError> {
        self.documents.ping().await
    }

    pub async fn ping_metadata(&self) -> Result<(), DbError> {
        self.metadata.ping().await
    }
}
