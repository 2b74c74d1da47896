//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: preflight, health checks, body
//! size guard, route matching and dispatch to the gateway handlers.

use crate::config::AppState;
use crate::handler::{movies, posters, ApiError, HandlerResult};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{match_route, Endpoint, RouteMatch};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const ENDPOINT_NOT_FOUND: &str = "Endpoint not found";
const BODY_READ_FAILED: &str = "Failed to read request body";

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let entry = state
        .access_log_enabled()
        .then(|| access_entry(&req, peer_addr));

    let response = dispatch(req, &state).await;

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a request and stamp the common headers on whatever comes back
pub async fn dispatch<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    let mut response = match route_request(&parts, body, state).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    };

    http::apply_common_headers(
        &mut response,
        &state.config.http.server_name,
        state.config.http.enable_cors,
    );
    response
}

async fn route_request<B>(parts: &Parts, body: B, state: &AppState) -> HandlerResult
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = parts.uri.path();

    // 1. CORS preflight for any path
    if parts.method == Method::OPTIONS {
        return Ok(http::build_options_response(state.config.http.enable_cors));
    }

    // 2. Health check endpoints
    let health = &state.config.routes.health;
    if health.enabled
        && parts.method == Method::GET
        && (path == health.liveness_path || path == health.readiness_path)
    {
        return Ok(http::build_health_response("ok"));
    }

    // 3. Declared body size
    if let Some(resp) = check_body_size(parts, state.config.http.max_body_size) {
        return Ok(resp);
    }

    // 4. Route table
    let endpoint = match match_route(&parts.method, path) {
        RouteMatch::Found(endpoint) => endpoint,
        RouteMatch::MethodNotAllowed(allow) => {
            logger::log_warning(&format!("Method not allowed: {} {path}", parts.method));
            return Ok(http::build_405_response(allow));
        }
        RouteMatch::NotFound => return Err(ApiError::not_found(ENDPOINT_NOT_FOUND)),
    };

    match endpoint {
        Endpoint::SearchMovies { title } => movies::search_movies(state, title).await,
        Endpoint::MovieData { id } => movies::movie_data(state, id).await,
        Endpoint::MovieReviews { id } => movies::movie_reviews(state, id).await,
        Endpoint::StreamingById { id } => movies::streaming_by_id(state, id).await,
        Endpoint::StreamingSearch { title } => movies::streaming_search(state, title).await,
        Endpoint::Poster { id } => posters::proxy_poster(state, id).await,
        Endpoint::UploadedPoster { id } => posters::uploaded_poster(state, id).await,
        Endpoint::UploadPoster { id } => {
            let body = match read_body(body, state.config.http.max_body_size).await {
                Ok(body) => body,
                Err(resp) => return Ok(resp),
            };
            let content_type = parts
                .headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            posters::upload_poster(state, id, content_type, body).await
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(parts: &Parts, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = parts.headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Buffer the request body, enforcing the size limit on the actual stream
async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<http_body_util::LengthLimitError>() => {
            logger::log_error(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("{BODY_READ_FAILED}: {e}"));
            Err(http::build_error_response(StatusCode::BAD_REQUEST, BODY_READ_FAILED))
        }
    }
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: hyper::header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}
