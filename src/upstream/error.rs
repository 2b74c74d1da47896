//! Upstream error type

/// Failure talking to a third-party API
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service} API key is not configured")]
    MissingApiKey { service: &'static str },

    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} responded with status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} returned invalid JSON: {source}")]
    InvalidJson {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} has no result: {message}")]
    NotFound {
        service: &'static str,
        message: String,
    },

    #[error("{service} body exceeds {limit} bytes")]
    TooLarge { service: &'static str, limit: usize },

    #[error("no poster available for {0}")]
    NoPoster(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl UpstreamError {
    /// Whether the failure means "the upstream has nothing for this key"
    /// rather than "the upstream call broke"
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoPoster(_))
    }
}
