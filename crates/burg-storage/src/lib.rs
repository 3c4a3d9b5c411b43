//! Key-value persistence for the Burg client.
//!
//! This crate provides:
//! - the [`KeyValueStore`] trait the auth layer persists through
//! - [`MemoryStore`] and the JSON-file backed [`FileStore`]
//! - [`TokenVault`], which owns the access token and the auth key set

mod file;
mod keys;
mod memory;
mod traits;
mod vault;

pub use file::FileStore;
pub use keys::StorageKeys;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;
pub use vault::TokenVault;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific storage error
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStore::new();

        storage.set("test_key", "test_value").unwrap();
        assert_eq!(storage.get("test_key").unwrap(), Some("test_value".to_string()));

        assert!(storage.has("test_key").unwrap());
        assert!(!storage.has("nonexistent").unwrap());

        assert!(storage.delete("test_key").unwrap());
        assert!(!storage.delete("test_key").unwrap());
        assert_eq!(storage.get("test_key").unwrap(), None);
    }

    #[test]
    fn test_vault_token_roundtrip() {
        let vault = TokenVault::new(Arc::new(MemoryStore::new()));

        assert!(!vault.has_access_token().unwrap());
        vault.set_access_token("T").unwrap();
        assert_eq!(vault.access_token().unwrap(), Some("T".to_string()));
    }

    #[test]
    fn test_vault_blank_token_is_absent() {
        let vault = TokenVault::new(Arc::new(MemoryStore::with_entries([(
            StorageKeys::ACCESS_TOKEN,
            "   ",
        )])));
        assert_eq!(vault.access_token().unwrap(), None);
    }

    #[test]
    fn test_vault_clear_only_removes_owned_keys() {
        let storage = Arc::new(MemoryStore::with_entries([
            (StorageKeys::ACCESS_TOKEN, "T"),
            (StorageKeys::LEGACY_SESSION, "{}"),
            ("author-preferences", "compact"),
            ("checklist-draft", "[]"),
        ]));
        let vault = TokenVault::new(storage.clone());

        let mut removed = vault.clear_auth_keys().unwrap();
        removed.sort();
        assert_eq!(
            removed,
            vec![
                StorageKeys::ACCESS_TOKEN.to_string(),
                StorageKeys::LEGACY_SESSION.to_string()
            ]
        );
        assert_eq!(
            storage.keys().unwrap(),
            vec!["author-preferences".to_string(), "checklist-draft".to_string()]
        );
    }

    #[test]
    fn test_vault_clear_on_empty_store_is_noop() {
        let vault = TokenVault::new(Arc::new(MemoryStore::new()));
        assert!(vault.clear_auth_keys().unwrap().is_empty());
        assert!(vault.clear_auth_keys().unwrap().is_empty());
    }
}
