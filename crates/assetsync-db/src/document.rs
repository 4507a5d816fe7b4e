use crate::error::DbError;
use crate::handle::DatabaseHandle;
use assetsync_core::models::AssetDocument;
use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

/// Schemaless document store keyed by asset id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or fully replace the document with `document.id`.
    async fn upsert(&self, document: &AssetDocument) -> Result<(), DbError>;

    async fn get(&self, id: Uuid) -> Result<Option<AssetDocument>, DbError>;

    /// Remove the document. Removing a missing document succeeds.
    async fn delete(&self, id: Uuid) -> Result<(), DbError>;

    async fn ping(&self) -> Result<(), DbError>;
}

/// Document store backed by JSONB rows in `asset_documents`.
#[derive(Clone)]
pub struct PgDocumentStore {
    handle: DatabaseHandle,
}

impl PgDocumentStore {
    pub fn new(handle: DatabaseHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn upsert(&self, document: &AssetDocument) -> Result<(), DbError> {
        let pool = self.handle.pool().await?;

        sqlx::query(
            r#"
            INSERT INTO asset_documents (id, body, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE
            SET body = EXCLUDED.body, updated_at = NOW()
            "#,
        )
        .bind(document.id)
        .bind(Json(document))
        .execute(&pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetDocument>, DbError> {
        let pool = self.handle.pool().await?;

        let body = sqlx::query_scalar::<_, Json<AssetDocument>>(
            "SELECT body FROM asset_documents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&pool)
        .await?;

        Ok(body.map(|Json(document)| document))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let pool = self.handle.pool().await?;

        sqlx::query("DELETE FROM asset_documents WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.handle.ping().await
    }
}
