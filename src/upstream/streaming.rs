//! Streaming availability client (RapidAPI)

use hyper::body::Bytes;
use reqwest::Client;

use super::{fetch_json, require_key, UpstreamError};
use crate::config::UpstreamConfig;
use crate::model::MovieId;

const SERVICE: &str = "streaming availability";

pub struct StreamingClient {
    http: Client,
    base_url: String,
    host: String,
    api_key: Option<String>,
    country: String,
}

impl StreamingClient {
    pub fn new(http: Client, config: &UpstreamConfig) -> Self {
        Self {
            http,
            base_url: config.streaming_base_url.trim_end_matches('/').to_string(),
            host: config.streaming_host.clone(),
            api_key: config.streaming_api_key.clone(),
            country: config.streaming_country.clone(),
        }
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, UpstreamError> {
        let api_key = require_key(SERVICE, self.api_key.as_deref())?;
        Ok(self
            .http
            .get(format!("{}{path}", self.base_url))
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", &self.host))
    }

    /// Availability of one title by IMDb id
    pub async fn by_id(&self, id: &MovieId) -> Result<Bytes, UpstreamError> {
        let request = self.get("/v2/get/basic")?.query(&[("imdb_id", id.as_str())]);
        fetch_json(SERVICE, request).await
    }

    /// Title search restricted to movies in the configured country
    pub async fn search(&self, title: &str) -> Result<Bytes, UpstreamError> {
        let request = self.get("/search/basic")?.query(&[
            ("title", title),
            ("country", self.country.as_str()),
            ("type", "movie"),
        ]);
        fetch_json(SERVICE, request).await
    }
}
