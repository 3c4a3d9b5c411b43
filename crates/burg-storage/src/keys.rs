//! Storage key constants.

/// Storage keys owned by the client's auth layer.
pub struct StorageKeys;

impl StorageKeys {
    /// Bearer access token
    pub const ACCESS_TOKEN: &'static str = "auth-token";

    /// Serialized session written by older builds of the login screen
    pub const LEGACY_SESSION: &'static str = "authSession";

    /// Session blob persisted by the hosted auth provider SDK
    pub const PROVIDER_SESSION: &'static str = "supabase.auth.token";

    /// Every key wiped when auth data is cleared. Nothing else is touched.
    pub const OWNED_AUTH_KEYS: [&'static str; 3] = [
        Self::ACCESS_TOKEN,
        Self::LEGACY_SESSION,
        Self::PROVIDER_SESSION,
    ];

    /// Whether `key` belongs to the auth layer.
    pub fn is_auth_key(key: &str) -> bool {
        Self::OWNED_AUTH_KEYS.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_keys_are_auth_keys() {
        for key in StorageKeys::OWNED_AUTH_KEYS {
            assert!(StorageKeys::is_auth_key(key));
        }
    }

    #[test]
    fn test_substring_matches_are_not_auth_keys() {
        // Keys that merely look auth-related must survive a clear
        assert!(!StorageKeys::is_auth_key("author-preferences"));
        assert!(!StorageKeys::is_auth_key("checklist-token-cache"));
        assert!(!StorageKeys::is_auth_key("supabase.settings"));
        assert!(!StorageKeys::is_auth_key("auth-token-old"));
    }

    #[test]
    fn test_keys_are_unique() {
        let unique: std::collections::HashSet<_> = StorageKeys::OWNED_AUTH_KEYS.iter().collect();
        assert_eq!(unique.len(), StorageKeys::OWNED_AUTH_KEYS.len());
    }
}
