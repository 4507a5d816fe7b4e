use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::AssetService;
use assetsync_core::models::{
    AssetUpdate, CreateAssetRequest, CreateAssetResponse, DeleteAssetResponse,
};
use assetsync_core::AppError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

/// Path ids arrive as raw strings so a blank or malformed id becomes a 400
/// with our error body rather than axum's plain-text rejection.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("id is required".to_string()));
    }
    Ok(Uuid::parse_str(raw)?)
}

#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset registered; upload content to uploadUrl", body = CreateAssetResponse),
        (status = 400, description = "Missing fields or invalid JSON", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 500, description = "A store call failed", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(skip(service, request), fields(operation = "create_asset"))]
pub async fn create_asset(
    State(service): State<AssetService>,
    ValidatedJson(request): ValidatedJson<CreateAssetRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let created = service.create(&request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    responses(
        (status = 200, description = "All assets, newest first", body = serde_json::Value),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 500, description = "Relational store failed", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(skip(service), fields(operation = "list_assets"))]
pub async fn list_assets(
    State(service): State<AssetService>,
) -> Result<impl IntoResponse, HttpAppError> {
    let assets = service.list().await?;
    Ok(Json(assets))
}

#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Document and relational copies merged", body = serde_json::Value),
        (status = 400, description = "Missing or malformed id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 404, description = "In neither store", body = ErrorResponse),
        (status = 500, description = "A store call failed", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(skip(service), fields(operation = "get_asset"))]
pub async fn get_asset(
    State(service): State<AssetService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_id(&id)?;
    let asset = service.get(id).await?;
    Ok(Json(asset))
}

#[utoipa::path(
    put,
    path = "/assets/{id}",
    tag = "assets",
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    request_body = AssetUpdate,
    responses(
        (status = 200, description = "Document as written", body = serde_json::Value),
        (status = 400, description = "Missing id or invalid JSON", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 500, description = "A store call failed; stores may have diverged", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(skip(service, update), fields(operation = "update_asset"))]
pub async fn update_asset(
    State(service): State<AssetService>,
    Path(id): Path<String>,
    ValidatedJson(update): ValidatedJson<AssetUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_id(&id)?;
    let document = service.update(id, &update).await?;
    Ok(Json(document))
}

#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    params(
        ("id" = Uuid, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Deleted, or nothing to delete", body = DeleteAssetResponse),
        (status = 400, description = "Missing or malformed id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 500, description = "A store call failed; deletion may be partial", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[tracing::instrument(skip(service), fields(operation = "delete_asset"))]
pub async fn delete_asset(
    State(service): State<AssetService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_id(&id)?;
    let result: DeleteAssetResponse = service.delete(id).await?;
    Ok(Json(result))
}

/// `/assets/` with no id segment.
pub async fn missing_id() -> HttpAppError {
    HttpAppError(AppError::Validation("id is required".to_string()))
}
