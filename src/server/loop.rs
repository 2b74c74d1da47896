// Server loop module
// Accepts connections until shutdown, then drains in-flight requests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::{self, Shutdown};
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop on `listener` until `shutdown` is triggered.
///
/// Once triggered the listener is closed, so new connections are refused,
/// and active connections get `performance.shutdown_grace_secs` to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Shutdown>,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let mut stop = shutdown.subscribe();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(
                        stream,
                        peer_addr,
                        &state,
                        &active_connections,
                        shutdown.subscribe(),
                    ),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            _ = signal::wait_for(&mut stop) => break,
        }
    }

    drop(listener);
    logger::log_shutdown(active_connections.load(Ordering::SeqCst));

    let grace = Duration::from_secs(state.config.performance.shutdown_grace_secs);
    let remaining = drain_connections(&active_connections, grace).await;
    if remaining == 0 {
        logger::log_info("All connections closed, bye");
    } else {
        logger::log_warning(&format!(
            "Grace period of {}s elapsed with {remaining} connection(s) still open",
            grace.as_secs()
        ));
    }
    Ok(())
}

/// Wait until no connection is active or `grace` elapses; returns what is left
async fn drain_connections(active: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let count = active.load(Ordering::SeqCst);
        if count == 0 || tokio::time::Instant::now() >= deadline {
            return count;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;

    fn test_state() -> Arc<AppState> {
        let mut cfg = Config::defaults().unwrap();
        cfg.logging.access_log = false;
        cfg.performance.shutdown_grace_secs = 1;
        Arc::new(AppState::new(&cfg).unwrap())
    }

    #[tokio::test]
    async fn test_serves_then_stops_on_shutdown() {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Shutdown::new());
        let server = tokio::spawn(start_server_loop(
            listener,
            test_state(),
            Arc::clone(&shutdown),
        ));

        let resp = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["access-control-allow-origin"].to_str().unwrap(),
            "*"
        );
        assert_eq!(resp.text().await.unwrap(), "ok");

        let resp = reqwest::get(format!("http://{addr}/movies/data/bogus"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let active = AtomicUsize::new(2);
        let left = drain_connections(&active, Duration::from_millis(120)).await;
        assert_eq!(left, 2);

        active.store(0, Ordering::SeqCst);
        assert_eq!(drain_connections(&active, Duration::from_secs(5)).await, 0);
    }
}
