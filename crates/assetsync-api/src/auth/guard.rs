//! Shared-secret access guard.

use assetsync_core::AuthFailure;
use subtle::ConstantTimeEq;

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Loggable form of a secret: at most three leading characters plus its length.
pub fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(3).collect();
    format!("{}*** (len {})", prefix, secret.chars().count())
}

/// Check `provided` against `expected`.
///
/// With no secret configured every request passes. Surrounding whitespace is
/// ignored on both sides.
pub fn validate(expected: Option<&str>, provided: Option<&str>) -> Result<(), AuthFailure> {
    let expected = match expected.map(str::trim) {
        Some(secret) if !secret.is_empty() => secret,
        _ => {
            tracing::warn!("API_KEY is not configured; request allowed without authentication");
            return Ok(());
        }
    };

    let provided = match provided.map(str::trim) {
        Some(token) if !token.is_empty() => token,
        _ => {
            tracing::warn!("Authentication failed: API key missing");
            return Err(AuthFailure::MissingCredential);
        }
    };

    if !secure_compare(expected, provided) {
        tracing::warn!(
            provided = %redact(provided),
            "Authentication failed: API key mismatch"
        );
        return Err(AuthFailure::InvalidCredential);
    }

    tracing::debug!(provided = %redact(provided), "Authentication succeeded");
    Ok(())
}
