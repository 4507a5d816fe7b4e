use crate::keys::{name_from_path, object_path, url_path};
use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::TryStreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt};
use std::time::{Duration, Instant};

/// S3 (or S3-compatible) object store. The bucket is the asset container.
#[derive(Clone)]
pub struct S3BlobStore {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3BlobStore {
    /// Build a store for `bucket`.
    ///
    /// Credentials come from the usual `AWS_*` environment variables.
    /// `endpoint_url` points at an S3-compatible provider, e.g.
    /// `http://localhost:9000` for MinIO.
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        Self::from_builder(AmazonS3Builder::from_env(), bucket, region, endpoint_url)
    }

    fn from_builder(
        builder: AmazonS3Builder,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = builder
            .with_region(region.clone())
            .with_bucket_name(bucket.clone())
            .with_virtual_hosted_style_request(false);

        if let Some(ref endpoint) = endpoint_url {
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(endpoint.starts_with("http://"));
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3BlobStore {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Path-style base URL; matches the host the presigned request is signed for.
    fn base_url(&self) -> String {
        match self.endpoint_url {
            Some(ref endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://s3.{}.amazonaws.com/{}", self.region, self.bucket),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn container(&self) -> &str {
        &self.bucket
    }

    async fn generate_write_credential(
        &self,
        blob_name: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let location = object_path(None, blob_name)?;

        let url = self
            .store
            .signed_url(Method::PUT, &location, expires_in)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    blob_name = %blob_name,
                    "S3 presign failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?;

        url.query().map(str::to_string).ok_or_else(|| {
            StorageError::SigningFailed("presigned URL carries no query string".to_string())
        })
    }

    fn public_url(&self, blob_name: &str) -> StorageResult<String> {
        let location = object_path(None, blob_name)?;
        Ok(format!("{}/{}", self.base_url(), url_path(&location)))
    }

    async fn list_names(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let start = Instant::now();
        let location = object_path(None, prefix)?;

        let objects: Vec<_> = self
            .store
            .list(Some(&location))
            .try_collect()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    prefix = %prefix,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 list failed"
                );
                StorageError::ListFailed(e.to_string())
            })?;

        let names: Vec<String> = objects
            .into_iter()
            .filter_map(|meta| name_from_path(None, &meta.location))
            .collect();

        tracing::debug!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = names.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(names)
    }

    async fn delete_by_name(&self, blob_name: &str) -> StorageResult<()> {
        let start = Instant::now();
        let location = object_path(None, blob_name)?;

        match self.store.delete(&location).await {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    blob_name = %blob_name,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            blob_name = %blob_name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(endpoint: Option<&str>) -> S3BlobStore {
        S3BlobStore::new(
            "assets".to_string(),
            "eu-west-1".to_string(),
            endpoint.map(String::from),
        )
        .unwrap()
    }

    #[test]
    fn test_public_url_aws() {
        assert_eq!(
            store(None).public_url("abc/a.png").unwrap(),
            "https://s3.eu-west-1.amazonaws.com/assets/abc/a.png"
        );
    }

    #[test]
    fn test_public_url_custom_endpoint() {
        assert_eq!(
            store(Some("http://localhost:9000/")).public_url("abc/a.png").unwrap(),
            "http://localhost:9000/assets/abc/a.png"
        );
    }

    #[tokio::test]
    async fn test_public_url_matches_presigned_url() {
        let store = S3BlobStore::from_builder(
            AmazonS3Builder::new()
                .with_access_key_id("AKIDEXAMPLE")
                .with_secret_access_key("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY"),
            "assets".to_string(),
            "eu-west-1".to_string(),
            None,
        )
        .unwrap();

        for name in ["abc/a.png", "abc/my shot#1.png", "abc/100%.png"] {
            let location = object_path(None, name).unwrap();
            let signed = store
                .store
                .signed_url(Method::PUT, &location, Duration::from_secs(60))
                .await
                .unwrap();
            let (unsigned, query) = signed.as_str().split_once('?').unwrap();

            assert_eq!(store.public_url(name).unwrap(), unsigned, "{name}");

            let credential = store
                .generate_write_credential(name, Duration::from_secs(60))
                .await
                .unwrap();
            assert!(credential.contains("X-Amz-Signature="));
            assert_eq!(
                credential.split('&').count(),
                query.split('&').count(),
                "{name}"
            );
        }
    }

    #[test]
    fn test_public_url_rejects_traversal() {
        assert!(matches!(
            store(None).public_url("../a.png"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
