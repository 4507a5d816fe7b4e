//! Single-origin CORS.
//!
//! Every response carries `Access-Control-Allow-Origin` for the one configured
//! origin. Preflight `OPTIONS` requests are answered here with 204, before
//! authentication, listing the verbs the path supports.

use crate::constants::{CORS_ALLOWED_HEADERS, PREFLIGHT_MAX_AGE_SECS};
use axum::{
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use tower_http::set_header::SetResponseHeaderLayer;

const COLLECTION_METHODS: &[Method] = &[Method::GET, Method::POST];
const ITEM_METHODS: &[Method] = &[Method::GET, Method::PUT, Method::DELETE];

pub fn allow_origin_layer(origin: HeaderValue) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin)
}

/// `Access-Control-Allow-Methods` value: the requested verb when this path
/// supports it, otherwise every supported verb.
fn allowed_methods(headers: &HeaderMap, supported: &[Method]) -> String {
    let requested = headers
        .get(header::ACCESS_CONTROL_REQUEST_METHOD)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<Method>().ok())
        .filter(|method| supported.contains(method));

    match requested {
        Some(method) => format!("{}, OPTIONS", method),
        None => supported
            .iter()
            .map(Method::as_str)
            .chain(std::iter::once("OPTIONS"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn preflight_response(headers: &HeaderMap, supported: &[Method]) -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                allowed_methods(headers, supported),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                CORS_ALLOWED_HEADERS.to_string(),
            ),
            (
                header::ACCESS_CONTROL_MAX_AGE,
                PREFLIGHT_MAX_AGE_SECS.to_string(),
            ),
        ],
    )
        .into_response()
}

/// `OPTIONS /assets`
pub async fn collection_preflight(headers: HeaderMap) -> Response {
    preflight_response(&headers, COLLECTION_METHODS)
}

/// `OPTIONS /assets/{id}`
pub async fn item_preflight(headers: HeaderMap) -> Response {
    preflight_response(&headers, ITEM_METHODS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requesting(method: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_str(method).unwrap(),
        );
        headers
    }

    #[test]
    fn test_allowed_methods_echoes_supported_verb() {
        assert_eq!(allowed_methods(&requesting("PUT"), ITEM_METHODS), "PUT, OPTIONS");
        assert_eq!(allowed_methods(&requesting("POST"), COLLECTION_METHODS), "POST, OPTIONS");
    }

    #[test]
    fn test_allowed_methods_falls_back_to_all() {
        assert_eq!(
            allowed_methods(&HeaderMap::new(), ITEM_METHODS),
            "GET, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            allowed_methods(&requesting("DELETE"), COLLECTION_METHODS),
            "GET, POST, OPTIONS"
        );
    }

    #[tokio::test]
    async fn test_preflight_is_no_content() {
        let response = item_preflight(requesting("DELETE")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, x-api-key"
        );
        assert_eq!(response.headers()[header::ACCESS_CONTROL_MAX_AGE], "3600");
    }
}
