//! Object storage setup

use anyhow::{Context, Result};
use assetsync_core::Config;
use assetsync_storage::{create_blob_store, BlobStore};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn BlobStore>> {
    let store = create_blob_store(config)
        .await
        .context("Failed to initialize object storage")?;

    tracing::info!(
        backend = %store.backend_type(),
        container = %store.container(),
        upload_url_ttl_secs = config.upload_url_ttl_secs,
        "Object storage ready"
    );

    Ok(store)
}
