//! JSON file backed store.
//!
//! The whole map lives in memory and is rewritten to disk after every
//! mutation via a temp file and rename, so a crash never leaves a torn file.

use crate::{KeyValueStore, StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key-value store persisted as a single JSON object.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating an empty one if the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();

        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    StorageError::Encoding(format!("{}: {}", path.display(), e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), entries = data.len(), "Opened file store");

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let encoded = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, encoded)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply `change` to a copy of the map, persist it, and keep it only if
    /// the write succeeded.
    fn update<T>(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> T,
        changed: impl Fn(&T) -> bool,
    ) -> StorageResult<T> {
        let mut data = self.data.lock();
        let mut next = data.clone();
        let result = change(&mut next);
        if changed(&result) {
            self.persist(&next)?;
            *data = next;
        }
        Ok(result)
    }
}

impl KeyValueStore for FileStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(
            |data| {
                data.insert(key.to_string(), value.to_string());
            },
            |_| true,
        )
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        self.update(|data| data.remove(key).is_some(), |removed| *removed)
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.data.lock().keys().cloned().collect())
    }

    fn delete_many(&self, keys: &[String]) -> StorageResult<usize> {
        self.update(
            |data| keys.iter().filter(|key| data.remove(*key).is_some()).count(),
            |removed| *removed > 0,
        )
    }
}
