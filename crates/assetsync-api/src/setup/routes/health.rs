//! Health check handlers.

use crate::constants::READINESS_TIMEOUT;
use crate::services::AssetService;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use utoipa::ToSchema;

/// Run an async check with timeout; "ready", "timeout", or "not_ready: {error}".
async fn run_check<F, E>(timeout: Duration, f: F) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "ready".to_string(),
        Ok(Err(e)) => format!("not_ready: {}", e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    pub status: String,
    pub document_store: String,
    pub relational_store: String,
}

/// Liveness check: the process is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness check: both databases answer `SELECT 1`.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Both stores reachable", body = ReadinessResponse),
        (status = 503, description = "A store is unreachable", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(State(service): State<AssetService>) -> impl IntoResponse {
    let (document, relational) = tokio::join!(
        run_check(READINESS_TIMEOUT, service.ping_documents()),
        run_check(READINESS_TIMEOUT, service.ping_metadata()),
    );

    let ready = document == "ready" && relational == "ready";
    if !ready {
        tracing::error!(
            document_store = %document,
            relational_store = %relational,
            "Readiness check failed"
        );
    }

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            document_store: document,
            relational_store: relational,
        }),
    )
}
