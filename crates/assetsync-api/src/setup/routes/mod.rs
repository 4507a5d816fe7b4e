//! Route configuration and setup.

pub mod health;

use crate::api_doc::ApiDoc;
use crate::auth::auth_middleware;
use crate::constants::{HTTP_CONCURRENCY_LIMIT, MAX_BODY_BYTES};
use crate::handlers::assets;
use crate::middleware::{
    allow_origin_layer, collection_preflight, item_preflight, request_id_middleware, RequestId,
};
use crate::state::AppState;
use assetsync_core::Config;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Request},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let origin = HeaderValue::from_str(&config.cors_allowed_origin).map_err(|e| {
        anyhow::anyhow!(
            "CORS_ALLOWED_ORIGIN is not a valid header value ({}): {}",
            config.cors_allowed_origin,
            e
        )
    })?;

    Ok(build_router(state, origin))
}

/// Assemble the router around `state`. Used directly by the integration tests.
pub fn build_router(state: Arc<AppState>, allowed_origin: HeaderValue) -> Router {
    let protected_routes = asset_routes().layer(axum::middleware::from_fn_with_state(
        state.auth.clone(),
        auth_middleware,
    ));

    let public_routes = Router::new()
        .route("/health", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    public_routes
        .merge(protected_routes)
        .with_state(state)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(DefaultBodyLimit::disable())
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(allow_origin_layer(allowed_origin))
}

fn asset_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/assets",
            get(assets::list_assets)
                .post(assets::create_asset)
                .options(collection_preflight),
        )
        .route(
            "/assets/",
            get(assets::missing_id)
                .put(assets::missing_id)
                .delete(assets::missing_id)
                .options(item_preflight),
        )
        .route(
            "/assets/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset)
                .options(item_preflight),
        )
}
