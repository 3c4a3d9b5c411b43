//! Storage trait definitions.

use crate::StorageResult;

/// Persistent string key-value store (the platform's async-storage equivalent).
pub trait KeyValueStore: Send + Sync {
    /// Store a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value. Returns whether the key existed.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// List every key currently stored.
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Delete several keys, returning how many existed.
    fn delete_many(&self, keys: &[String]) -> StorageResult<usize> {
        let mut removed = 0;
        for key in keys {
            if self.delete(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
