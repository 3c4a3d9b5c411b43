//! Configuration management for the client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default backend API base URL (can be overridden at compile time via BURG_API_URL env var).
pub const DEFAULT_API_BASE_URL: &str = match option_env!("BURG_API_URL") {
    Some(url) => url,
    None => "https://burg-dashboard.nl/api",
};

/// Host that issues QR codes pointing into the app.
pub const DEFAULT_SCAN_HOST: &str = "api.burg-dashboard.nl";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The one route reachable without a session.
pub const DEFAULT_PUBLIC_PATH: &str = "/login";

/// Where signed-in users land.
pub const DEFAULT_DEFAULT_PRIVATE_PATH: &str = "/";

const DEFAULT_SESSION_CHECK_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_STARTUP_RETRY_DELAY_MS: u64 = 5_000;
const DEFAULT_REDIRECT_COOLDOWN_MS: u64 = 1_000;
const DEFAULT_NAVIGATION_RETRY_DELAY_MS: u64 = 500;

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Backend API base URL, without trailing slash.
    pub api_base_url: String,
    /// Host whose QR codes deep-link into the app.
    pub scan_host: String,
    /// Upper bound for the startup session check.
    pub session_check_timeout_ms: u64,
    /// Upper bound for every other backend call.
    pub request_timeout_ms: u64,
    /// Delay before the single re-validation after a failed startup check.
    pub startup_retry_delay_ms: u64,
    /// Window in which a repeated redirect to the same target is suppressed.
    pub redirect_cooldown_ms: u64,
    /// Delay before retrying a failed navigation.
    pub navigation_retry_delay_ms: u64,
    /// Route reachable without authentication.
    pub public_path: String,
    /// Route authenticated users are sent to.
    pub default_private_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            scan_host: DEFAULT_SCAN_HOST.to_string(),
            session_check_timeout_ms: DEFAULT_SESSION_CHECK_TIMEOUT_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            startup_retry_delay_ms: DEFAULT_STARTUP_RETRY_DELAY_MS,
            redirect_cooldown_ms: DEFAULT_REDIRECT_COOLDOWN_MS,
            navigation_retry_delay_ms: DEFAULT_NAVIGATION_RETRY_DELAY_MS,
            public_path: DEFAULT_PUBLIC_PATH.to_string(),
            default_private_path: DEFAULT_DEFAULT_PRIVATE_PATH.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults.
    ///
    /// Environment variables take precedence over the file.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `BURG_API_URL` and `BURG_LOG_LEVEL` style overrides from `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(api_url) = non_empty("BURG_API_URL") {
            self.api_base_url = api_url;
        }
        if let Some(log_level) = non_empty("BURG_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    /// Check that URLs parse and routes are absolute.
    pub fn validate(&self) -> CoreResult<()> {
        self.api_base_url()?;

        for (name, route) in [
            ("public_path", &self.public_path),
            ("default_private_path", &self.default_private_path),
        ] {
            if !route.starts_with('/') {
                return Err(CoreError::Config(format!(
                    "{} must start with '/', got {:?}",
                    name, route
                )));
            }
        }

        if self.public_path == self.default_private_path {
            return Err(CoreError::Config(
                "public_path and default_private_path must differ".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the API base URL as a parsed URL.
    pub fn api_base_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_base_url).map_err(CoreError::from)
    }

    pub fn session_check_timeout(&self) -> Duration {
        Duration::from_millis(self.session_check_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn startup_retry_delay(&self) -> Duration {
        Duration::from_millis(self.startup_retry_delay_ms)
    }

    pub fn redirect_cooldown(&self) -> Duration {
        Duration::from_millis(self.redirect_cooldown_ms)
    }

    pub fn navigation_retry_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.session_check_timeout(), Duration::from_secs(10));
        assert_eq!(config.startup_retry_delay(), Duration::from_secs(5));
        assert_eq!(config.public_path, "/login");
        assert_eq!(config.default_private_path, "/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file_partial() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        std::fs::write(
            &config_path,
            r#"{ "log_level": "debug", "request_timeout_ms": 2500 }"#,
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
        // Missing fields fall back to defaults
        assert_eq!(config.scan_host, DEFAULT_SCAN_HOST);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.scan_host, DEFAULT_SCAN_HOST);
    }

    #[test]
    fn test_overrides_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("BURG_API_URL", "http://localhost:3000/api"),
            ("BURG_LOG_LEVEL", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        // Blank values are ignored
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_validate_rejects_relative_route() {
        let mut config = Config::default();
        config.public_path = "login".to_string();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_identical_routes() {
        let mut config = Config::default();
        config.default_private_path = "/login".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_invalid_url() {
        let mut config = Config::default();
        config.api_base_url = "not a valid url".to_string();
        assert!(config.api_base_url().is_err());
        assert!(config.validate().is_err());
    }
}
