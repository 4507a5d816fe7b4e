//! Configuration module
//!
//! Settings are read from the process environment (and a `.env` file when
//! present) once at startup. `Config::from_vars` takes an explicit lookup so
//! tests can build a configuration without touching the global environment.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const UPLOAD_URL_TTL_SECS: u64 = 2 * 60 * 60;
const STORAGE_CONTAINER: &str = "assets";
const CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";
const LOG_LEVEL: &str = "info";
const OTEL_SERVICE_NAME: &str = "assetsync-api";
const OTEL_PROTOCOL: &str = "grpc";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    /// Shared API secret. `None` means the access guard lets every request through.
    pub api_key: Option<String>,
    pub cors_allowed_origin: String,
    pub database_url: String,
    pub document_database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub storage_backend: StorageBackend,
    pub storage_container: String,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_signing_key: Option<String>,
    pub upload_url_ttl_secs: u64,
    pub log_level: String,
    /// Master switch for OTLP export; export also needs an endpoint.
    pub otel_enabled: bool,
    pub otel_endpoint: Option<String>,
    /// `grpc` or `http`
    pub otel_protocol: String,
    pub otel_service_name: String,
    /// Fraction of traces kept, clamped to `0.0..=1.0`
    pub otel_sample_ratio: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = non_empty("ENVIRONMENT")
            .or_else(|| non_empty("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match non_empty("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let storage_backend = match non_empty("STORAGE_BACKEND") {
            Some(backend) => backend.parse()?,
            None => StorageBackend::S3,
        };

        // `API_KEY=` counts as unset. A value of only whitespace is almost
        // certainly a mistake and would otherwise open every endpoint.
        let api_key = var("API_KEY").filter(|key| !key.is_empty());
        if api_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            return Err(anyhow::anyhow!(
                "API_KEY contains only whitespace; set a real key or leave it empty to disable authentication"
            ));
        }

        let database_url =
            non_empty("DATABASE_URL").ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let config = Config {
            server_port,
            environment,
            // Not trimmed here: the guard trims both sides at comparison time.
            api_key,
            cors_allowed_origin: non_empty("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| CORS_ALLOWED_ORIGIN.to_string()),
            document_database_url: non_empty("DOCUMENT_DATABASE_URL")
                .unwrap_or_else(|| database_url.clone()),
            database_url,
            db_max_connections: non_empty("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: non_empty("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            storage_container: non_empty("STORAGE_CONTAINER")
                .unwrap_or_else(|| STORAGE_CONTAINER.to_string()),
            s3_region: non_empty("S3_REGION").or_else(|| non_empty("AWS_REGION")),
            s3_endpoint: non_empty("S3_ENDPOINT"),
            local_storage_path: non_empty("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty("LOCAL_STORAGE_BASE_URL"),
            local_signing_key: non_empty("LOCAL_SIGNING_KEY"),
            upload_url_ttl_secs: non_empty("UPLOAD_URL_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|&ttl| ttl > 0)
                .unwrap_or(UPLOAD_URL_TTL_SECS),
            log_level: non_empty("LOG_LEVEL")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| LOG_LEVEL.to_string()),
            otel_enabled: non_empty("OTEL_ENABLED")
                .map(|s| s.to_lowercase())
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
            otel_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
            otel_protocol: non_empty("OTEL_EXPORTER_OTLP_PROTOCOL")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| OTEL_PROTOCOL.to_string()),
            otel_service_name: non_empty("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| OTEL_SERVICE_NAME.to_string()),
            otel_sample_ratio: non_empty("OTEL_SAMPLE_RATIO")
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|ratio| ratio.is_finite())
                .map(|ratio| ratio.clamp(0.0, 1.0))
                .unwrap_or(1.0),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// OTLP collector endpoint, when trace export is switched on.
    pub fn otel_endpoint(&self) -> Option<&str> {
        if self.otel_enabled {
            self.otel_endpoint.as_deref()
        } else {
            None
        }
    }

    pub fn upload_url_ttl(&self) -> Duration {
        Duration::from_secs(self.upload_url_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if !self.document_database_url.starts_with("postgres://")
            && !self.document_database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DOCUMENT_DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.is_production() {
            if self.cors_allowed_origin.trim() == "*" {
                return Err(anyhow::anyhow!(
                    "CORS_ALLOWED_ORIGIN cannot be '*' in production. Please specify an explicit origin."
                ));
            }
            if self.api_key.is_none() {
                return Err(anyhow::anyhow!(
                    "API_KEY must be set in production; the unauthenticated fallback is only available outside production"
                ));
            }
        }

        if !matches!(self.otel_protocol.as_str(), "grpc" | "http") {
            return Err(anyhow::anyhow!(
                "OTEL_EXPORTER_OTLP_PROTOCOL must be 'grpc' or 'http', got '{}'",
                self.otel_protocol
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
                if self.local_signing_key.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_SIGNING_KEY must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
