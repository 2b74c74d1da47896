//! Outbound API clients
//!
//! Thin wrappers over one shared `reqwest::Client`. Each call performs a single
//! GET against a fixed third-party endpoint and hands back either the raw JSON
//! body (checked to be JSON, otherwise untouched) or a small typed subset.

mod error;
mod omdb;
mod streaming;

use std::time::Duration;

use hyper::body::Bytes;
use reqwest::Client;

use crate::config::UpstreamConfig;
use crate::logger;

pub use error::UpstreamError;
pub use omdb::{OmdbClient, PosterImage};
pub use streaming::StreamingClient;

/// Build the HTTP client shared by every upstream
pub fn build_http_client(
    config: &UpstreamConfig,
    user_agent: &str,
) -> Result<Client, UpstreamError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(user_agent)
        .build()
        .map_err(UpstreamError::Client)
}

/// Send a prepared request and return its body as validated JSON bytes
async fn fetch_json(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<Bytes, UpstreamError> {
    let body = fetch_bytes(service, request, None).await?.1;

    // Parse only to reject non-JSON; the original bytes are relayed as-is.
    serde_json::from_slice::<serde::de::IgnoredAny>(&body)
        .map_err(|source| UpstreamError::InvalidJson { service, source })?;

    Ok(body)
}

/// Send a prepared request and return `(content-type, body)` on 2xx
///
/// With `limit` set, bodies larger than `limit` bytes are refused.
async fn fetch_bytes(
    service: &'static str,
    request: reqwest::RequestBuilder,
    limit: Option<usize>,
) -> Result<(Option<String>, Bytes), UpstreamError> {
    let transport = |source| UpstreamError::Transport { service, source };

    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    logger::log_debug(&format!("[Upstream] {service} {} -> {status}", response.url()));

    if !status.is_success() {
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let body = match limit {
        Some(limit) => read_limited(service, response, limit).await?,
        None => response.bytes().await.map_err(transport)?,
    };

    Ok((content_type, body))
}

async fn read_limited(
    service: &'static str,
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Bytes, UpstreamError> {
    let too_large = UpstreamError::TooLarge { service, limit };
    if response
        .content_length()
        .is_some_and(|len| len > u64::try_from(limit).unwrap_or(u64::MAX))
    {
        return Err(too_large);
    }

    let mut buf = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| UpstreamError::Transport { service, source })?
    {
        if buf.len() + chunk.len() > limit {
            return Err(too_large);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

/// Key lookup shared by both clients
fn require_key<'a>(
    service: &'static str,
    key: Option<&'a str>,
) -> Result<&'a str, UpstreamError> {
    key.filter(|k| !k.trim().is_empty())
        .ok_or(UpstreamError::MissingApiKey { service })
}
