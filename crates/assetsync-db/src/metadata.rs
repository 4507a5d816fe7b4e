//! `file_metadata` repository.
//!
//! Every method is a single parameterized statement; the table has no
//! transaction shared with the document store.

use crate::error::DbError;
use crate::handle::DatabaseHandle;
use assetsync_core::models::{AssetRecord, AssetStatus, AssetUpdate, NewAsset};
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a row with `status = 'pending'`, no owner and `created_at = now`.
    async fn insert(&self, asset: &NewAsset) -> Result<AssetRecord, DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<AssetRecord>, DbError>;

    /// All rows, newest first.
    async fn list(&self) -> Result<Vec<AssetRecord>, DbError>;

    /// Apply the present fields of `update`. Returns the number of rows
    /// changed; an update with no fields issues no statement and returns 0.
    async fn update(&self, id: Uuid, update: &AssetUpdate) -> Result<u64, DbError>;

    /// Returns the number of rows removed.
    async fn delete(&self, id: Uuid) -> Result<u64, DbError>;

    async fn ping(&self) -> Result<(), DbError>;
}

#[derive(Clone)]
pub struct PgMetadataStore {
    handle: DatabaseHandle,
}

impl PgMetadataStore {
    pub fn new(handle: DatabaseHandle) -> Self {
        Self { handle }
    }
}

/// Build `UPDATE file_metadata SET ... WHERE id = $n`, or `None` when there is
/// nothing to set.
fn build_update(id: Uuid, update: &AssetUpdate) -> Option<QueryBuilder<'static, Postgres>> {
    if update.is_empty() {
        return None;
    }

    let mut builder = QueryBuilder::<Postgres>::new("UPDATE file_metadata SET ");
    let mut set = builder.separated(", ");
    if let Some(ref file_name) = update.file_name {
        set.push("file_name = ").push_bind_unseparated(file_name.clone());
    }
    if let Some(ref file_type) = update.file_type {
        set.push("file_type = ").push_bind_unseparated(file_type.clone());
    }
    if let Some(file_size) = update.file_size {
        set.push("file_size = ").push_bind_unseparated(file_size);
    }
    if let Some(ref blob_url) = update.blob_url {
        set.push("blob_url = ").push_bind_unseparated(blob_url.clone());
    }
    if let Some(status) = update.status() {
        set.push("status = ").push_bind_unseparated(status.to_string());
    }
    builder.push(" WHERE id = ").push_bind(id);

    Some(builder)
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn insert(&self, asset: &NewAsset) -> Result<AssetRecord, DbError> {
        let pool = self.handle.pool().await?;

        let record = sqlx::query_as::<_, AssetRecord>(
            r#"
            INSERT INTO file_metadata (id, user_id, file_name, file_type, file_size, blob_url, status, created_at)
            VALUES ($1, NULL, $2, $3, $4, $5, $6, NOW())
            RETURNING id, user_id, file_name, file_type, file_size, blob_url, status, created_at
            "#,
        )
        .bind(asset.id)
        .bind(&asset.file_name)
        .bind(&asset.file_type)
        .bind(asset.file_size)
        .bind(&asset.blob_url)
        .bind(AssetStatus::Pending.as_str())
        .fetch_one(&pool)
        .await?;

        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetRecord>, DbError> {
        let pool = self.handle.pool().await?;

        let record = sqlx::query_as::<_, AssetRecord>(
            r#"
            SELECT id, user_id, file_name, file_type, file_size, blob_url, status, created_at
            FROM file_metadata
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&pool)
        .await?;

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<AssetRecord>, DbError> {
        let pool = self.handle.pool().await?;

        let records = sqlx::query_as::<_, AssetRecord>(
            r#"
            SELECT id, user_id, file_name, file_type, file_size, blob_url, status, created_at
            FROM file_metadata
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&pool)
        .await?;

        Ok(records)
    }

    async fn update(&self, id: Uuid, update: &AssetUpdate) -> Result<u64, DbError> {
        let Some(mut query) = build_update(id, update) else {
            return Ok(0);
        };

        let pool = self.handle.pool().await?;
        let result = query.build().execute(&pool).await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> Result<u64, DbError> {
        let pool = self.handle.pool().await?;

        let result = sqlx::query("DELETE FROM file_metadata WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.handle.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_update_skips_empty() {
        assert!(build_update(Uuid::new_v4(), &AssetUpdate::default()).is_none());
    }

    #[test]
    fn test_build_update_sets_only_present_columns() {
        let update = AssetUpdate {
            file_name: Some("b.png".to_string()),
            status: Some("complete".to_string()),
            ..Default::default()
        };
        let query = build_update(Uuid::new_v4(), &update).unwrap();
        assert_eq!(
            query.sql(),
            "UPDATE file_metadata SET file_name = $1, status = $2 WHERE id = $3"
        );
    }

    #[test]
    fn test_build_update_blank_status_is_skipped() {
        let update = AssetUpdate {
            status: Some(String::new()),
            ..Default::default()
        };
        assert!(build_update(Uuid::new_v4(), &update).is_none());

        let update = AssetUpdate {
            file_size: Some(10),
            status: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            build_update(Uuid::new_v4(), &update).unwrap().sql(),
            "UPDATE file_metadata SET file_size = $1 WHERE id = $2"
        );
    }

    #[test]
    fn test_build_update_all_columns() {
        let update = AssetUpdate {
            file_name: Some("b.png".to_string()),
            file_type: Some("image/webp".to_string()),
            file_size: Some(10),
            blob_url: Some("https://x/y".to_string()),
            status: None,
        };
        let query = build_update(Uuid::new_v4(), &update).unwrap();
        assert_eq!(
            query.sql(),
            "UPDATE file_metadata SET file_name = $1, file_type = $2, file_size = $3, blob_url = $4 WHERE id = $5"
        );
    }
}
