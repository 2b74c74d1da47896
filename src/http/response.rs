//! HTTP response building module
//!
//! Builders for the gateway's response shapes. Every error leaves the gateway
//! as `{"error": true, "message": "..."}`.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ALLOW, CONTENT_LENGTH, CONTENT_TYPE,
    SERVER,
};
use hyper::{Response, StatusCode};
use serde::Serialize;

const JSON: &str = "application/json";

pub const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: bool,
    pub message: &'a str,
}

/// Build the fixed-shape JSON error response
pub fn build_error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(&ErrorBody {
        error: true,
        message,
    })
    .unwrap_or_else(|_| br#"{"error":true}"#.to_vec());

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(status)
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<Full<Bytes>> {
    let mut resp = build_error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    if let Ok(value) = HeaderValue::from_str(allow) {
        resp.headers_mut().insert(ALLOW, value);
    }
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
}

/// Relay JSON bytes as received
pub fn build_json_bytes_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    let len = body.len();
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .header(CONTENT_LENGTH, len)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Serialize `body` as JSON
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build_json_bytes_response(status, Bytes::from(json)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Build image response
pub fn build_image_response(content_type: &str, data: Bytes) -> Response<Full<Bytes>> {
    let len = data.len();
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, len)
        .body(Full::new(data))
        .unwrap_or_else(|e| {
            log_build_error("image", &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, CORS_ALLOW_METHODS);

    if enable_cors {
        builder = builder.header(ACCESS_CONTROL_MAX_AGE, "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        fallback(StatusCode::NO_CONTENT)
    })
}

/// Build health check response
pub fn build_health_response(status: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain")
        .header("Cache-Control", "no-cache, no-store")
        .body(Full::new(Bytes::from(status.to_string())))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            fallback(StatusCode::OK)
        })
}

/// Stamp CORS and `Server` headers onto an outgoing response
pub fn apply_common_headers(
    resp: &mut Response<Full<Bytes>>,
    server_name: &str,
    enable_cors: bool,
) {
    let headers = resp.headers_mut();
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert(SERVER, value);
    }
    if enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        );
    }
}

fn fallback(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
