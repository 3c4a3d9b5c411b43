//! CLI command implementations.

mod auth;
mod route;

pub use auth::{login, logout, status, whoami};
pub use route::{route, scan};

use anyhow::{Context as _, Result};
use burg_config::{init_logging, parse_level, Config, Paths};
use burg_session::SessionStore;
use burg_storage::FileStore;
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs: configuration and the session store backed
/// by `~/.burg/store.json`.
pub struct Context {
    pub config: Config,
    pub store: SessionStore,
}

impl Context {
    pub fn load(log_level: Option<&str>) -> Result<Self> {
        let paths = Paths::new()?;
        let config = Config::load(&paths)
            .with_context(|| format!("loading {}", paths.config_file().display()))?;

        let level = parse_level(log_level.unwrap_or(&config.log_level))
            .to_string()
            .to_lowercase();
        init_logging("cli", &level);

        paths.ensure_dirs()?;
        let storage = FileStore::open(paths.store_file())
            .with_context(|| format!("opening {}", paths.store_file().display()))?;
        debug!(path = %storage.path().display(), "Using file store");

        let store = SessionStore::new(&config, Arc::new(storage))?;

        Ok(Self { config, store })
    }
}
