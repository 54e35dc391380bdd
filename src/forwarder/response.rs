//! Response construction for the gateway
//!
//! Builders for the redirect, error, and relayed responses the forwarder
//! and the gateway send back to clients.

use crate::error::ForwardError;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Content type forced on error responses
pub const ERROR_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Connection-scoped headers a proxy must not relay
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Check if a header is connection-scoped
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Copy a header map, dropping connection-scoped headers
pub fn end_to_end_headers(headers: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_hop_by_hop(name) {
            relayed.append(name.clone(), value.clone());
        }
    }
    relayed
}

/// `302 Found` pointing at `location`
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = StatusCode::FOUND.into_response();
            response.headers_mut().insert(LOCATION, value);
            response
        }
        Err(e) => server_error(&ForwardError::invalid_location(location, e)),
    }
}

/// `403 Forbidden` with a fixed body
pub fn forbidden(message: &'static str) -> Response {
    (StatusCode::FORBIDDEN, message).into_response()
}

/// `500` describing the error
pub fn server_error(err: &ForwardError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(CONTENT_TYPE, HeaderValue::from_static(ERROR_CONTENT_TYPE))],
        format!("server error {}", err),
    )
        .into_response()
}

/// Assemble a streamed response from upstream parts
pub fn relayed(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hop_by_hop_filtered() {
        let mut headers = HeaderMap::new();
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("content-length", HeaderValue::from_static("10"));
        headers.insert("etag", HeaderValue::from_static("\"abc\""));

        let relayed = end_to_end_headers(&headers);
        assert_eq!(relayed.len(), 2);
        assert!(relayed.contains_key("content-length"));
        assert!(relayed.contains_key("etag"));
    }

    #[test]
    fn test_found_sets_location() {
        let response = found("https://cdn.jsdelivr.net/gh/a/b@main/c");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "https://cdn.jsdelivr.net/gh/a/b@main/c"
        );
    }

    #[test]
    fn test_found_with_invalid_location() {
        let response = found("https://github.com/a\nb");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_server_error_content_type() {
        let response = server_error(&ForwardError::TooManyRedirects { limit: 5 });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], ERROR_CONTENT_TYPE);
    }
}
