//! # Observability
//!
//! Logging setup shared by the Burg client crates.
//!
//! Crates are **log producers**: they use the standard `tracing` macros and
//! never decide where output goes. The hosting binary calls
//! [`init_with_config`] once at startup, which installs:
//!
//! - a compact, human-readable layer on stderr, and
//! - optionally a JSON-lines layer appended to a log file
//!   (`~/.burg/logs/burg.jsonl` by default), suitable for `tail -f | jq`.
//!
//! `RUST_LOG` always overrides the configured default level.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "cli".into(),
//!         default_level: "warn".into(),
//!         ..Default::default()
//!     });
//!
//!     tracing::info!("ready");
//! }
//! ```

mod file;

pub use file::{default_log_path, JsonlFileWriter};

use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "cli", "app").
    /// Recorded once at startup so log files can be filtered per process.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Write JSON lines to this file in addition to stderr.
    pub log_path: Option<PathBuf>,

    /// Emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: true,
        }
    }
}

/// Initialize the observability layer with default settings.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize the observability layer with custom configuration.
///
/// Safe to call more than once: only the first call installs a subscriber.
/// If the log file cannot be opened, logging continues on stderr only.
pub fn init_with_config(config: LogConfig) {
    let mut file_error = None;
    let file_writer = config
        .log_path
        .as_ref()
        .and_then(|path| match JsonlFileWriter::open(path) {
            Ok(writer) => Some(writer),
            Err(e) => {
                file_error = Some(format!("{}: {}", path.display(), e));
                None
            }
        });

    // Without a file sink stderr is the only place logs can go.
    let want_stderr = config.also_stderr || file_writer.is_none();

    let stderr_layer = want_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    let file_layer = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(writer)
            .with_filter(env_filter(&config.default_level))
    });

    let installed = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if !installed {
        return;
    }

    tracing::info!(
        service = %config.service_name,
        pid = std::process::id(),
        log_path = ?config.log_path,
        "observability initialized"
    );

    if let Some(error) = file_error {
        tracing::warn!(error = %error, "log file unavailable, logging to stderr only");
    }
}

/// Build the level filter from `RUST_LOG`, falling back to `default_level`.
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Re-export tracing macros for convenience.
/// Crates can use `observability::info!()` or `tracing::info!()`.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(config.also_stderr);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init("first");
        init("second");
        tracing::info!("still logging");
    }
}
