//! OMDb client
//!
//! Search by title, lookup by id, the review subset of a lookup, and poster
//! download via the `Poster` URL of a lookup.

use hyper::body::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{fetch_bytes, fetch_json, require_key, UpstreamError};
use crate::config::UpstreamConfig;
use crate::model::MovieId;

const SERVICE: &str = "OMDb";
const POSTER_SERVICE: &str = "poster host";
const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_POSTER_TYPE: &str = "image/jpeg";
const DEFAULT_POSTER_LIMIT: usize = 10 * 1024 * 1024;

pub struct OmdbClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    poster_limit: usize,
}

/// Fields of an OMDb title lookup the gateway reads itself
#[derive(Debug, Deserialize)]
struct OmdbTitle {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
    #[serde(rename = "Poster", default)]
    poster: Option<String>,
}

impl OmdbTitle {
    fn is_miss(&self) -> bool {
        self.response
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("false"))
    }
}

/// Rating entry as OMDb reports it
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Rating {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Review subset of a title lookup
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct MovieReviews {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbVotes", default)]
    pub imdb_votes: Option<String>,
    #[serde(rename = "Metascore", default)]
    pub metascore: Option<String>,
    #[serde(rename = "Ratings", default)]
    pub ratings: Vec<Rating>,
}

/// Downloaded poster bytes
#[derive(Debug, Clone)]
pub struct PosterImage {
    pub content_type: String,
    pub data: Bytes,
}

impl OmdbClient {
    pub fn new(http: Client, config: &UpstreamConfig) -> Self {
        Self {
            http,
            base_url: config.omdb_base_url.clone(),
            api_key: config.omdb_api_key.clone(),
            poster_limit: DEFAULT_POSTER_LIMIT,
        }
    }

    /// Cap on downloaded poster size in bytes
    #[must_use]
    pub fn with_poster_limit(mut self, limit: usize) -> Self {
        self.poster_limit = limit;
        self
    }

    fn request(&self, param: &str, value: &str) -> Result<reqwest::RequestBuilder, UpstreamError> {
        let api_key = require_key(SERVICE, self.api_key.as_deref())?;
        Ok(self
            .http
            .get(&self.base_url)
            .query(&[(param, value), ("apikey", api_key)]))
    }

    /// `?s=<title>`; upstream JSON relayed unchanged
    pub async fn search(&self, title: &str) -> Result<Bytes, UpstreamError> {
        fetch_json(SERVICE, self.request("s", title)?).await
    }

    /// `?i=<id>`; upstream JSON relayed unchanged
    pub async fn lookup(&self, id: &MovieId) -> Result<Bytes, UpstreamError> {
        fetch_json(SERVICE, self.request("i", id.as_str())?).await
    }

    pub async fn reviews(&self, id: &MovieId) -> Result<MovieReviews, UpstreamError> {
        let body = self.lookup(id).await?;
        let title: OmdbTitle = decode(&body)?;
        if title.is_miss() {
            return Err(UpstreamError::NotFound {
                service: SERVICE,
                message: title.error.unwrap_or_else(|| "Movie not found!".to_string()),
            });
        }
        decode(&body)
    }

    /// Poster URL from a title lookup; `N/A` and misses count as no poster
    pub async fn poster_url(&self, id: &MovieId) -> Result<String, UpstreamError> {
        let body = self.lookup(id).await?;
        let title: OmdbTitle = decode(&body)?;
        if title.is_miss() {
            return Err(UpstreamError::NoPoster(id.to_string()));
        }

        title
            .poster
            .filter(|url| !url.is_empty() && url != NOT_AVAILABLE)
            .ok_or_else(|| UpstreamError::NoPoster(id.to_string()))
    }

    /// Resolve the poster URL and download the image
    pub async fn fetch_poster(&self, id: &MovieId) -> Result<PosterImage, UpstreamError> {
        let url = self.poster_url(id).await?;
        let request = self.http.get(&url);
        let (content_type, data) =
            fetch_bytes(POSTER_SERVICE, request, Some(self.poster_limit)).await?;

        Ok(PosterImage {
            content_type: content_type
                .filter(|ct| ct.starts_with("image/"))
                .unwrap_or_else(|| DEFAULT_POSTER_TYPE.to_string()),
            data,
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, UpstreamError> {
    serde_json::from_slice(body).map_err(|source| UpstreamError::InvalidJson {
        service: SERVICE,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::mock;

    fn config(base_url: &str, key: Option<&str>) -> UpstreamConfig {
        UpstreamConfig {
            omdb_base_url: format!("{base_url}/"),
            omdb_api_key: key.map(ToString::to_string),
            streaming_base_url: base_url.to_string(),
            streaming_host: "streaming.test".to_string(),
            streaming_api_key: None,
            streaming_country: "us".to_string(),
            timeout_secs: 5,
        }
    }

    fn client(base_url: &str, key: Option<&str>) -> OmdbClient {
        OmdbClient::new(Client::new(), &config(base_url, key))
    }

    fn id(s: &str) -> MovieId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_lookup_relays_body_unchanged() {
        let body = br#"{"Title":"The Shawshank Redemption","imdbID":"tt0111161",  "Response":"True"}"#;
        let upstream = mock::start(move |_| (200, "application/json", body.to_vec())).await;

        let got = client(&upstream.url(), Some("k3y"))
            .lookup(&id("tt0111161"))
            .await
            .unwrap();
        assert_eq!(&got[..], &body[..]);

        let seen = upstream.requests();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].path_and_query.contains("i=tt0111161"));
        assert!(seen[0].path_and_query.contains("apikey=k3y"));
    }

    #[tokio::test]
    async fn test_search_encodes_title() {
        let upstream =
            mock::start(|_| (200, "application/json", b"{\"Search\":[]}".to_vec())).await;

        client(&upstream.url(), Some("k"))
            .search("The Matrix")
            .await
            .unwrap();

        let seen = upstream.requests();
        assert!(seen[0].path_and_query.contains("s=The+Matrix"));
    }

    #[tokio::test]
    async fn test_missing_key_skips_upstream() {
        let upstream = mock::start(|_| (200, "application/json", b"{}".to_vec())).await;

        let err = client(&upstream.url(), None)
            .lookup(&id("tt0111161"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::MissingApiKey { .. }));
        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_and_bad_json() {
        let failing = mock::start(|_| (503, "text/plain", b"down".to_vec())).await;
        let err = client(&failing.url(), Some("k"))
            .lookup(&id("tt0111161"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 503, .. }));

        let garbage = mock::start(|_| (200, "text/html", b"<html>".to_vec())).await;
        let err = client(&garbage.url(), Some("k"))
            .lookup(&id("tt0111161"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidJson { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let url = mock::unreachable_url().await;
        let err = client(&url, Some("k"))
            .search("Alien")
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_reviews_subset() {
        let body = br#"{"Title":"Heat","imdbID":"tt0113277","imdbRating":"8.3","imdbVotes":"700,000","Metascore":"76","Plot":"...","Ratings":[{"Source":"Rotten Tomatoes","Value":"83%"}],"Response":"True"}"#;
        let upstream = mock::start(move |_| (200, "application/json", body.to_vec())).await;

        let reviews = client(&upstream.url(), Some("k"))
            .reviews(&id("tt0113277"))
            .await
            .unwrap();
        assert_eq!(reviews.imdb_id, "tt0113277");
        assert_eq!(reviews.imdb_rating.as_deref(), Some("8.3"));
        assert_eq!(
            reviews.ratings,
            vec![Rating {
                source: "Rotten Tomatoes".to_string(),
                value: "83%".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_reviews_miss_is_not_found() {
        let upstream = mock::start(|_| {
            (
                200,
                "application/json",
                br#"{"Response":"False","Error":"Incorrect IMDb ID."}"#.to_vec(),
            )
        })
        .await;

        let err = client(&upstream.url(), Some("k"))
            .reviews(&id("tt9999999"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_poster_not_available() {
        let upstream = mock::start(|_| {
            (
                200,
                "application/json",
                br#"{"imdbID":"tt0000001","Poster":"N/A","Response":"True"}"#.to_vec(),
            )
        })
        .await;

        let err = client(&upstream.url(), Some("k"))
            .fetch_poster(&id("tt0000001"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::NoPoster(_)));
    }

    #[tokio::test]
    async fn test_fetch_poster_follows_url() {
        let upstream = mock::start(|path| {
            if path.starts_with("/img/") {
                (200, "image/png", b"\x89PNG\r\n\x1a\nrest".to_vec())
            } else {
                (200, "application/json", Vec::new())
            }
        })
        .await;
        // The lookup has to point back at the mock, so answer it from a second mock.
        let poster_url = format!("{}/img/poster.png", upstream.url());
        let lookup = mock::start(move |_| {
            (
                200,
                "application/json",
                format!(r#"{{"Poster":"{poster_url}","Response":"True"}}"#).into_bytes(),
            )
        })
        .await;

        let image = client(&lookup.url(), Some("k"))
            .fetch_poster(&id("tt0000002"))
            .await
            .unwrap();
        assert_eq!(image.content_type, "image/png");
        assert!(image.data.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn test_fetch_poster_respects_size_limit() {
        let image = mock::start(|_| (200, "image/jpeg", vec![0xFF; 64])).await;
        let poster_url = format!("{}/big.jpg", image.url());
        let lookup = mock::start(move |_| {
            (
                200,
                "application/json",
                format!(r#"{{"Poster":"{poster_url}","Response":"True"}}"#).into_bytes(),
            )
        })
        .await;

        let err = client(&lookup.url(), Some("k"))
            .with_poster_limit(16)
            .fetch_poster(&id("tt0000003"))
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::TooLarge { limit: 16, .. }));
        assert!(!err.is_not_found());

        let ok = client(&lookup.url(), Some("k"))
            .with_poster_limit(64)
            .fetch_poster(&id("tt0000003"))
            .await
            .unwrap();
        assert_eq!(ok.data.len(), 64);
    }
}
