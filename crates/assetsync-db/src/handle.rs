//! Process-scoped connection handle.
//!
//! A `DatabaseHandle` owns one lazily-created `PgPool`. It is built once at
//! startup, cloned into whatever needs it, and closed on shutdown. The first
//! caller to need a connection creates the pool; concurrent first callers all
//! wait on the same initialization.

use crate::error::DbError;
use assetsync_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl PoolSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_connections: config.db_max_connections,
            acquire_timeout: Duration::from_secs(config.db_timeout_seconds),
        }
    }
}

#[derive(Clone)]
pub struct DatabaseHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    name: &'static str,
    url: String,
    settings: PoolSettings,
    pool: OnceCell<PgPool>,
}

impl DatabaseHandle {
    /// `name` only labels log lines ("relational", "document").
    pub fn new(name: &'static str, url: impl Into<String>, settings: PoolSettings) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                name,
                url: url.into(),
                settings,
                pool: OnceCell::new(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// The pool, connecting on first use.
    pub async fn pool(&self) -> Result<PgPool, DbError> {
        let pool = self
            .inner
            .pool
            .get_or_try_init(|| async {
                let start = Instant::now();
                tracing::info!(store = self.inner.name, "Connecting to database...");

                let pool = PgPoolOptions::new()
                    .max_connections(self.inner.settings.max_connections)
                    .acquire_timeout(self.inner.settings.acquire_timeout)
                    .idle_timeout(Duration::from_secs(600))
                    .max_lifetime(Duration::from_secs(1800))
                    .connect(&self.inner.url)
                    .await
                    .inspect_err(|e| {
                        tracing::error!(store = self.inner.name, error = %e, "Database connection failed");
                    })?;

                tracing::info!(
                    store = self.inner.name,
                    max_connections = self.inner.settings.max_connections,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Database connected successfully"
                );
                Ok::<_, DbError>(pool)
            })
            .await?;

        Ok(pool.clone())
    }

    /// Connect now and apply pending migrations from the workspace `migrations/` directory.
    pub async fn init(&self) -> Result<(), DbError> {
        let pool = self.pool().await?;

        let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
        let migrator = sqlx::migrate::Migrator::new(migrations_dir).await?;
        migrator.run(&pool).await?;

        tracing::info!(store = self.inner.name, "Database migrations applied");
        Ok(())
    }

    /// Round-trip `SELECT 1`.
    pub async fn ping(&self) -> Result<(), DbError> {
        let pool = self.pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool if one was ever opened.
    pub async fn shutdown(&self) {
        if let Some(pool) = self.inner.pool.get() {
            pool.close().await;
            tracing::info!(store = self.inner.name, "Database pool closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PoolSettings {
        PoolSettings {
            max_connections: 1,
            acquire_timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn test_shutdown_without_pool_is_noop() {
        let handle = DatabaseHandle::new("relational", "postgresql://localhost:1/none", settings());
        handle.shutdown().await;
        assert_eq!(handle.name(), "relational");
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported_and_retried() {
        let handle = DatabaseHandle::new("document", "postgresql://127.0.0.1:1/none", settings());
        assert!(handle.pool().await.is_err());
        // a failed init leaves the cell empty so the next caller tries again
        assert!(handle.clone().ping().await.is_err());
    }
}
