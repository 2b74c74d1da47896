// Application state module
// Shared handles built once at startup and cloned into every connection

use super::types::Config;
use crate::storage::PosterStore;
use crate::upstream::{OmdbClient, StreamingClient, UpstreamError};

/// Application state
pub struct AppState {
    pub config: Config,
    pub omdb: OmdbClient,
    pub streaming: StreamingClient,
    pub posters: PosterStore,
}

impl AppState {
    /// Build the shared HTTP client and upstream handles from configuration
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let http = crate::upstream::build_http_client(&config.upstream, &config.http.server_name)?;

        Ok(Self {
            config: config.clone(),
            omdb: OmdbClient::new(http.clone(), &config.upstream).with_poster_limit(
                usize::try_from(config.http.max_body_size).unwrap_or(usize::MAX),
            ),
            streaming: StreamingClient::new(http, &config.upstream),
            posters: PosterStore::new(&config.storage.upload_dir),
        })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }

    pub fn debug_enabled(&self) -> bool {
        self.config.logging.is_debug()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_follow_config() {
        let mut cfg = Config::defaults().unwrap();
        cfg.logging.access_log = false;
        cfg.logging.level = "debug".to_string();
        let state = AppState::new(&cfg).unwrap();
        assert!(!state.access_log_enabled());
        assert!(state.debug_enabled());

        cfg.logging.access_log = true;
        cfg.logging.level = "info".to_string();
        let state = AppState::new(&cfg).unwrap();
        assert!(state.access_log_enabled());
        assert!(!state.debug_enabled());
    }
}
