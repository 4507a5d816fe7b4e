//! Application state and sub-state extractors.

use crate::auth::AuthState;
use crate::services::AssetService;
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub assets: AssetService,
    pub auth: Arc<AuthState>,
}

impl AppState {
    pub fn new(assets: AssetService, api_key: Option<String>) -> Self {
        Self {
            assets,
            auth: Arc::new(AuthState { api_key }),
        }
    }
}

impl FromRef<Arc<AppState>> for AssetService {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.assets.clone()
    }
}
