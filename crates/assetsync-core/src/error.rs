//! Error types module
//!
//! All workflow failures are unified under `AppError`. Store failures keep the
//! name of the store that raised them so the server-side log says which of the
//! three backends diverged; clients only see the status and the raw message.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejected credentials
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "UPSTREAM_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// The backend a failing call was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Object,
    Document,
    Relational,
}

impl Display for StoreKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreKind::Object => write!(f, "object store"),
            StoreKind::Document => write!(f, "document store"),
            StoreKind::Relational => write!(f, "relational store"),
        }
    }
}

/// Access guard rejections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("API key is required")]
    MissingCredential,

    #[error("Invalid API key")]
    InvalidCredential,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthFailure),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{store} error: {message}")]
    Upstream { store: StoreKind, message: String },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a store failure, keeping its message verbatim.
    pub fn upstream(store: StoreKind, err: impl Display) -> Self {
        AppError::Upstream {
            store,
            message: err.to_string(),
        }
    }

    /// Get the error type name for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "ValidationError",
            AppError::Unauthorized(_) => "AuthFailure",
            AppError::NotFound(_) => "NotFound",
            AppError::Upstream { .. } => "UpstreamError",
            AppError::MalformedRequest(_) => "MalformedRequest",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("id must be a UUID: {}", err))
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) | AppError::MalformedRequest(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::NotFound(_) => 404,
            AppError::Upstream { .. } | AppError::Internal(_) => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::MalformedRequest(_) => "MALFORMED_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::MalformedRequest(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::Unauthorized(failure) => failure.to_string(),
            AppError::Upstream { message, .. } => message.clone(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::Validation(_) | AppError::NotFound(_) | AppError::MalformedRequest(_) => {
                LogLevel::Debug
            }
            AppError::Unauthorized(_) => LogLevel::Warn,
            AppError::Upstream { .. } | AppError::Internal(_) => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_upstream() {
        let err = AppError::upstream(StoreKind::Relational, "connection refused");
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");
        assert_eq!(err.client_message(), "connection refused");
        assert_eq!(err.log_level(), LogLevel::Error);
        assert_eq!(
            err.to_string(),
            "relational store error: connection refused"
        );
    }

    #[test]
    fn test_error_metadata_unauthorized() {
        let err = AppError::from(AuthFailure::MissingCredential);
        assert_eq!(err.http_status_code(), 401);
        assert_eq!(err.client_message(), "API key is required");
        assert_eq!(err.log_level(), LogLevel::Warn);

        let err = AppError::from(AuthFailure::InvalidCredential);
        assert_eq!(err.client_message(), "Invalid API key");
    }

    #[test]
    fn test_error_metadata_client_faults() {
        let err = AppError::Validation("fileName, fileType, fileSize are required".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.log_level(), LogLevel::Debug);

        let err = AppError::MalformedRequest("Invalid JSON".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "MALFORMED_REQUEST");

        let err = AppError::NotFound("Not Found".to_string());
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_uuid_error_is_validation() {
        let err: AppError = uuid::Uuid::parse_str("not-a-uuid").unwrap_err().into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
