//! High-level access to the persisted auth artifacts.

use crate::{KeyValueStore, StorageKeys, StorageResult};
use std::sync::Arc;

/// Owns the access token inside a shared [`KeyValueStore`].
#[derive(Clone)]
pub struct TokenVault {
    storage: Arc<dyn KeyValueStore>,
}

impl TokenVault {
    /// Create a vault over the given storage backend
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// The underlying store, for callers that persist their own data.
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Retrieve the access token. Blank values count as absent.
    pub fn access_token(&self) -> StorageResult<Option<String>> {
        Ok(self
            .storage
            .get(StorageKeys::ACCESS_TOKEN)?
            .filter(|token| !token.trim().is_empty()))
    }

    /// Store the access token
    pub fn set_access_token(&self, token: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::ACCESS_TOKEN, token)
    }

    /// Check whether an access token is stored
    pub fn has_access_token(&self) -> StorageResult<bool> {
        Ok(self.access_token()?.is_some())
    }

    /// Remove every owned auth key present in the store.
    ///
    /// Enumerates the stored keys and deletes the ones listed in
    /// [`StorageKeys::OWNED_AUTH_KEYS`]. Returns the keys that were removed.
    pub fn clear_auth_keys(&self) -> StorageResult<Vec<String>> {
        let auth_keys: Vec<String> = self
            .storage
            .keys()?
            .into_iter()
            .filter(|key| StorageKeys::is_auth_key(key))
            .collect();

        if auth_keys.is_empty() {
            return Ok(auth_keys);
        }

        tracing::debug!(keys = ?auth_keys, "Removing auth keys");
        self.storage.delete_many(&auth_keys)?;
        Ok(auth_keys)
    }
}
