//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::constants::API_KEY_HEADER;
use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use assetsync_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "assetsync API",
        version = "0.1.0",
        description = "Media-asset catalog. Each asset is registered here, uploaded straight to object storage with a short-lived write credential, and tracked in a document store and a relational table."
    ),
    paths(
        handlers::assets::create_asset,
        handlers::assets::list_assets,
        handlers::assets::get_asset,
        handlers::assets::update_asset,
        handlers::assets::delete_asset,
        health::liveness_check,
        health::readiness_check,
    ),
    components(
        schemas(
            models::CreateAssetRequest,
            models::CreateAssetResponse,
            models::AssetUpdate,
            models::AssetStatus,
            models::DeleteAssetResponse,
            error::ErrorResponse,
            health::ReadinessResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "assets", description = "Asset registration and metadata"),
        (name = "health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
        );
    }
}
