use crate::auth::guard;
use crate::constants::API_KEY_HEADER;
use crate::error::HttpAppError;
use assetsync_core::AppError;
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    /// `None` enables the unauthenticated fallback
    pub api_key: Option<String>,
}

/// Reject requests without a valid `x-api-key`. CORS preflights pass through.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Result<Response, HttpAppError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    guard::validate(auth_state.api_key.as_deref(), provided).map_err(AppError::from)?;

    Ok(next.run(request).await)
}
