//! Test helpers: build the router over in-memory stores.
//!
//! Run with `cargo test -p assetsync-api`. No database or object store is
//! needed.

use assetsync_api::setup::routes::build_router;
use assetsync_api::state::AppState;
use assetsync_api::AssetService;
use assetsync_db::{InMemoryDocumentStore, InMemoryMetadataStore};
use assetsync_storage::LocalBlobStore;
use axum::http::HeaderValue;
use axum_test::TestServer;
use object_store::memory::InMemory;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_API_KEY: &str = "test-api-key-0123456789";
pub const TEST_ORIGIN: &str = "http://localhost:3000";
pub const BLOB_BASE_URL: &str = "http://localhost:4000/blobs";
pub const CONTAINER: &str = "assets";

pub struct TestApp {
    pub server: TestServer,
    pub blobs: Arc<LocalBlobStore<InMemory>>,
    pub documents: InMemoryDocumentStore,
    pub metadata: InMemoryMetadataStore,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// App guarded by [`TEST_API_KEY`].
pub fn setup_test_app() -> TestApp {
    build_test_app(Some(TEST_API_KEY.to_string()))
}

/// App with no API key configured (open fallback).
pub fn setup_open_test_app() -> TestApp {
    build_test_app(None)
}

fn build_test_app(api_key: Option<String>) -> TestApp {
    let blobs = Arc::new(LocalBlobStore::in_memory(
        BLOB_BASE_URL.to_string(),
        CONTAINER.to_string(),
        "test-signing-key",
    ));
    let documents = InMemoryDocumentStore::new();
    let metadata = InMemoryMetadataStore::new();

    let assets = AssetService::new(
        blobs.clone(),
        Arc::new(documents.clone()),
        Arc::new(metadata.clone()),
        Duration::from_secs(600),
    );
    let state = Arc::new(AppState::new(assets, api_key));
    let router = build_router(state, HeaderValue::from_static(TEST_ORIGIN));

    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        blobs,
        documents,
        metadata,
    }
}
