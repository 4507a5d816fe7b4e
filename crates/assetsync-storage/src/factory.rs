use crate::{BlobStore, LocalBlobStore, S3BlobStore, StorageBackend, StorageError, StorageResult};
use assetsync_core::Config;
use std::sync::Arc;

/// Create the object store selected by `STORAGE_BACKEND`.
pub async fn create_blob_store(config: &Config) -> StorageResult<Arc<dyn BlobStore>> {
    match config.storage_backend {
        StorageBackend::S3 => {
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let store = S3BlobStore::new(
                config.storage_container.clone(),
                region,
                config.s3_endpoint.clone(),
            )?;
            Ok(Arc::new(store))
        }

        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;
            let signing_key = config.local_signing_key.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_SIGNING_KEY not configured".to_string())
            })?;

            let store = LocalBlobStore::new(
                base_path,
                base_url,
                config.storage_container.clone(),
                signing_key.into_bytes(),
            )
            .await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_local_store_from_config() {
        let dir = TempDir::new().unwrap();
        let vars: HashMap<&str, String> = HashMap::from([
            ("DATABASE_URL", "postgresql://localhost/assets".to_string()),
            ("STORAGE_BACKEND", "local".to_string()),
            ("STORAGE_CONTAINER", "media".to_string()),
            ("LOCAL_STORAGE_PATH", dir.path().display().to_string()),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:4000/blobs".to_string()),
            ("LOCAL_SIGNING_KEY", "dev-key".to_string()),
        ]);
        let config = Config::from_vars(|key| vars.get(key).cloned()).unwrap();

        let store = create_blob_store(&config).await.unwrap();
        assert_eq!(store.backend_type(), StorageBackend::Local);
        assert_eq!(store.container(), "media");
        assert_eq!(
            store.public_url("abc/a.png").unwrap(),
            "http://localhost:4000/blobs/media/abc/a.png"
        );
    }
}
