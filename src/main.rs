use std::sync::Arc;

use movie_gateway::config::{AppState, Config, DEFAULT_CONFIG_PATH};
use movie_gateway::logger;
use movie_gateway::server::{self, Shutdown};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path_from_args(std::env::args().skip(1))?;
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Tokio runtime sized by `server.workers`
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("Using {workers} worker threads"));
    } else {
        logger::log_info("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(&cfg)?);
    state.posters.ensure_dir().await?;

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let shutdown = Arc::new(Shutdown::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    server::start_server_loop(listener, state, shutdown).await?;
    Ok(())
}

/// `-c <path>` / `--config <path>`; anything else is rejected
fn config_path_from_args(mut args: impl Iterator<Item = String>) -> Result<String, String> {
    let mut path = DEFAULT_CONFIG_PATH.to_string();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                path = args
                    .next()
                    .ok_or_else(|| format!("{arg} requires a path"))?;
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(ToString::to_string).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_config_path_from_args() {
        assert_eq!(config_path_from_args(args(&[])).unwrap(), DEFAULT_CONFIG_PATH);
        assert_eq!(
            config_path_from_args(args(&["--config", "/etc/gateway"])).unwrap(),
            "/etc/gateway"
        );
        assert!(config_path_from_args(args(&["-c"])).is_err());
        assert!(config_path_from_args(args(&["--verbose"])).is_err());
    }
}
