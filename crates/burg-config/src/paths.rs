//! File system paths for the client.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths for the client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for client files (~/.burg)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.burg`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".burg"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.burg).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.burg/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the persisted key-value store (~/.burg/store.json).
    pub fn store_file(&self) -> PathBuf {
        self.base_dir.join("store.json")
    }

    /// Get the logs directory (~/.burg/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the JSON-lines log file (~/.burg/logs/burg.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("burg.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_layout() {
        let paths = Paths::with_base_dir(PathBuf::from("/tmp/burg-test"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/burg-test/config.json"));
        assert_eq!(paths.store_file(), PathBuf::from("/tmp/burg-test/store.json"));
        assert_eq!(
            paths.log_file(),
            PathBuf::from("/tmp/burg-test/logs/burg.jsonl")
        );
    }

    #[test]
    fn test_ensure_dirs_creates_logs_dir() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("nested"));

        paths.ensure_dirs().unwrap();
        assert!(paths.logs_dir().is_dir());
    }
}
