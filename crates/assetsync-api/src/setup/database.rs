//! Database setup and initialization

use anyhow::{Context, Result};
use assetsync_core::Config;
use assetsync_db::{DatabaseHandle, PoolSettings};

/// Connection handles for the two database-backed stores. When both stores
/// share one URL they share one pool.
#[derive(Clone)]
pub struct Databases {
    pub relational: DatabaseHandle,
    pub document: DatabaseHandle,
}

impl Databases {
    pub fn from_config(config: &Config) -> Self {
        let settings = PoolSettings::from_config(config);
        let relational = DatabaseHandle::new("relational", config.database_url.clone(), settings);
        let document = if config.document_database_url == config.database_url {
            relational.clone()
        } else {
            DatabaseHandle::new("document", config.document_database_url.clone(), settings)
        };

        Self {
            relational,
            document,
        }
    }

    fn shared(&self) -> bool {
        self.relational.name() == self.document.name()
    }

    /// Connect and migrate, failing fast if either database is unreachable.
    pub async fn init(&self) -> Result<()> {
        self.relational
            .init()
            .await
            .context("Failed to initialize relational database")?;

        if !self.shared() {
            self.document
                .init()
                .await
                .context("Failed to initialize document database")?;
        }

        Ok(())
    }

    pub async fn shutdown(&self) {
        self.relational.shutdown().await;
        if !self.shared() {
            self.document.shutdown().await;
        }
    }
}

pub async fn setup_databases(config: &Config) -> Result<Databases> {
    let databases = Databases::from_config(config);
    databases.init().await?;

    tracing::info!(
        shared_pool = databases.shared(),
        max_connections = config.db_max_connections,
        "Databases ready"
    );

    Ok(databases)
}
