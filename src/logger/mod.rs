//! Logger module
//!
//! Line-oriented logging for the gateway:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error, warning and debug lines
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    DEBUG_ENABLED.store(config.logging.is_debug(), Ordering::Relaxed);
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Movie gateway started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info(&format!("Upload directory: {}", config.storage.upload_dir));
    write_info(&format!(
        "OMDb: {} (key {})",
        config.upstream.omdb_base_url,
        key_state(config.upstream.omdb_api_key.as_deref())
    ));
    write_info(&format!(
        "Streaming: {} (key {})",
        config.upstream.streaming_base_url,
        key_state(config.upstream.streaming_api_key.as_deref())
    ));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

const fn key_state(key: Option<&str>) -> &'static str {
    match key {
        Some(_) => "set",
        None => "missing",
    }
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Written only when `logging.level` is `debug`
pub fn log_debug(message: &str) {
    if DEBUG_ENABLED.load(Ordering::Relaxed) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

pub fn log_upload_stored(id: &str, path: &std::path::Path, bytes: usize) {
    write_info(&format!("[Upload] {id}: {bytes} bytes -> {}", path.display()));
}

/// Goes through the configured writer so it lands in `access_log_file`
pub fn log_signal(name: &str) {
    write_info(&signal_message(name));
}

fn signal_message(name: &str) -> String {
    format!("\n[SIGNAL] {name} received, initiating graceful shutdown...")
}

pub fn log_shutdown(active: usize) {
    write_info(&format!(
        "\n[Shutdown] Stopped accepting; {active} connection(s) still active"
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_message() {
        let line = signal_message("SIGTERM");
        assert!(line.contains("[SIGNAL] SIGTERM received"));
    }

    #[test]
    fn test_key_state_never_shows_value() {
        assert_eq!(key_state(Some("secret")), "set");
        assert_eq!(key_state(None), "missing");
    }
}
