//! Logging initialization for the client.
//!
//! Thin wrapper over the workspace `observability` crate so binaries share
//! one setup: compact stderr output, plus a JSON-lines file when
//! `BURG_LOG_FILE` is set (`1` for the default location, or a path).

use crate::Paths;
use std::path::PathBuf;

/// Initialize logging for a Burg process.
///
/// # Arguments
///
/// * `service_name` - Recorded in the startup line (e.g. "cli")
/// * `level` - Default log level; `RUST_LOG` overrides it
pub fn init_logging(service_name: &str, level: &str) {
    let log_path = std::env::var("BURG_LOG_FILE")
        .ok()
        .and_then(|raw| log_path_from_env(&raw));

    observability::init_with_config(observability::LogConfig {
        service_name: service_name.into(),
        default_level: level.into(),
        log_path,
        also_stderr: true,
    });
}

fn log_path_from_env(raw: &str) -> Option<PathBuf> {
    match raw.trim() {
        "" | "0" | "false" => None,
        "1" | "true" => Some(
            Paths::new()
                .map(|paths| paths.log_file())
                .unwrap_or_else(|_| observability::default_log_path()),
        ),
        path => Some(PathBuf::from(path)),
    }
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
