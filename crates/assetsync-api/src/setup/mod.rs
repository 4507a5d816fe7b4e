//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::services::AssetService;
use crate::state::AppState;
use anyhow::{Context, Result};
use assetsync_core::Config;
use assetsync_db::{PgDocumentStore, PgMetadataStore};
use database::Databases;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router, Databases)> {
    crate::telemetry::init_tracing(config)?;
    validation::warn_on_insecure_config(config);
    tracing::info!("Configuration loaded and validated successfully");

    let databases = database::setup_databases(config).await?;
    let blobs = storage::setup_storage(config).await?;

    let assets = AssetService::new(
        blobs,
        Arc::new(PgDocumentStore::new(databases.document.clone())),
        Arc::new(PgMetadataStore::new(databases.relational.clone())),
        config.upload_url_ttl(),
    );
    let state = Arc::new(AppState::new(assets, config.api_key.clone()));

    let router = routes::setup_routes(config, state.clone()).context("Failed to set up routes")?;

    Ok((state, router, databases))
}
