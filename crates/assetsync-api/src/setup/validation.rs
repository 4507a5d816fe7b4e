//! Startup warnings for settings that are allowed but risky.

use assetsync_core::Config;

pub fn warn_on_insecure_config(config: &Config) {
    if config.api_key.is_none() {
        tracing::warn!(
            environment = %config.environment,
            "API_KEY is not set: every asset endpoint is open to unauthenticated requests"
        );
    }

    if config.cors_allowed_origin.trim() == "*" {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
    }
}
