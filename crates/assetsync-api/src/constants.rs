//! HTTP surface constants.

use std::time::Duration;

/// Header carrying the shared API secret. Header names are matched
/// case-insensitively, so `X-API-KEY` and `X-Api-Key` are accepted too.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Headers a browser may send on cross-origin asset requests.
pub const CORS_ALLOWED_HEADERS: &str = "Content-Type, x-api-key";

pub const PREFLIGHT_MAX_AGE_SECS: u64 = 3600;

/// Asset requests are small JSON documents; uploads go straight to the object store.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;

pub const READINESS_TIMEOUT: Duration = Duration::from_secs(5);
