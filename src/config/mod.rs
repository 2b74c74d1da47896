// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig, RoutesConfig,
    ServerConfig, StorageConfig, UpstreamConfig,
};

/// Default config file (without extension) looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::builder(Some(config_path))?.build()?.try_deserialize()
    }

    /// Configuration built from defaults and environment only
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::builder(None)?.build()?.try_deserialize()
    }

    fn builder(config_path: Option<&str>) -> Result<Builder, config::ConfigError> {
        Self::layered(config_path, gateway_env(), |name| std::env::var(name).ok())
    }

    /// Defaults, then the file, then `env`, then the plain API key variables
    /// resolved through `lookup`
    fn layered(
        config_path: Option<&str>,
        env: config::Environment,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Builder, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace_secs", 10)?
            .set_default("http.server_name", "movie-gateway/0.1")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("upstream.omdb_base_url", "http://www.omdbapi.com/")?
            .set_default(
                "upstream.streaming_base_url",
                "https://streaming-availability.p.rapidapi.com",
            )?
            .set_default(
                "upstream.streaming_host",
                "streaming-availability.p.rapidapi.com",
            )?
            .set_default("upstream.streaming_country", "us")?
            .set_default("upstream.timeout_secs", 15)?
            .set_default("storage.upload_dir", "uploads")?;

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder
            .add_source(env)
            .set_override_option(
                "upstream.omdb_api_key",
                first_non_empty(&["OMDB_API_KEY"], &lookup),
            )?
            .set_override_option(
                "upstream.streaming_api_key",
                first_non_empty(&["RAPID_API_KEY", "STREAM_API_KEY"], &lookup),
            )
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

/// `GATEWAY_SECTION__KEY` variables, e.g. `GATEWAY_SERVER__PORT`
fn gateway_env() -> config::Environment {
    config::Environment::with_prefix("GATEWAY")
        .prefix_separator("_")
        .separator("__")
}

/// First non-empty value among the given variable names
fn first_non_empty(names: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    names
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::load_from("does-not-exist").unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert!(cfg.http.enable_cors);
        assert_eq!(cfg.storage.upload_dir, "uploads");
        assert_eq!(cfg.upstream.streaming_country, "us");
        assert!(cfg.routes.health.enabled);
        assert_eq!(cfg.routes.health.liveness_path, "/healthz");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 7000\n\n[storage]\nupload_dir = \"/tmp/posters\"\n\n[upstream]\nstreaming_country = \"de\""
        )
        .unwrap();

        let base = path.with_extension("");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.storage.upload_dir, "/tmp/posters");
        assert_eq!(cfg.upstream.streaming_country, "de");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::defaults().unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:5000".parse().unwrap()
        );
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn load_with(
        config_path: Option<&str>,
        gateway: &[(&str, &str)],
        plain: &[(&str, &str)],
    ) -> Config {
        let plain = vars(plain);
        Config::layered(
            config_path,
            gateway_env().source(Some(vars(gateway))),
            |name| plain.get(name).cloned(),
        )
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap()
    }

    #[test]
    fn test_gateway_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "[server]\nport = 7000\n\n[http]\nenable_cors = true\n").unwrap();
        let base = path.with_extension("");

        let cfg = load_with(
            base.to_str(),
            &[
                ("GATEWAY_SERVER__PORT", "8088"),
                ("GATEWAY_HTTP__ENABLE_CORS", "false"),
            ],
            &[],
        );
        assert_eq!(cfg.server.port, 8088);
        assert!(!cfg.http.enable_cors);
        // Untouched keys keep the file or default value
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_plain_api_key_wins_over_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "[upstream]\nomdb_api_key = \"from-file\"\n").unwrap();
        let base = path.with_extension("");

        let cfg = load_with(base.to_str(), &[], &[]);
        assert_eq!(cfg.upstream.omdb_api_key.as_deref(), Some("from-file"));

        let cfg = load_with(
            base.to_str(),
            &[("GATEWAY_UPSTREAM__OMDB_API_KEY", "from-prefixed")],
            &[("OMDB_API_KEY", "from-plain")],
        );
        assert_eq!(cfg.upstream.omdb_api_key.as_deref(), Some("from-plain"));
    }

    #[test]
    fn test_streaming_key_aliases() {
        let cfg = load_with(None, &[], &[("STREAM_API_KEY", "alias")]);
        assert_eq!(cfg.upstream.streaming_api_key.as_deref(), Some("alias"));

        let cfg = load_with(
            None,
            &[],
            &[("RAPID_API_KEY", "rapid"), ("STREAM_API_KEY", "alias")],
        );
        assert_eq!(cfg.upstream.streaming_api_key.as_deref(), Some("rapid"));

        // Blank values are treated as unset
        let cfg = load_with(
            None,
            &[],
            &[("RAPID_API_KEY", "  "), ("STREAM_API_KEY", "alias")],
        );
        assert_eq!(cfg.upstream.streaming_api_key.as_deref(), Some("alias"));

        let cfg = load_with(None, &[], &[]);
        assert!(cfg.upstream.streaming_api_key.is_none());
    }
}
