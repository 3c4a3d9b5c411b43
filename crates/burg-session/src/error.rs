//! Authentication error types.

use crate::outcome::messages;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Credentials failed local validation
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Backend answered with a non-success status
    #[error("Request rejected with HTTP {status}")]
    Rejected {
        status: u16,
        /// Human-readable `error` field from the response body, if any
        message: Option<String>,
    },

    /// Backend rejected the bearer token (HTTP 401)
    #[error("Access token rejected")]
    Unauthorized,

    /// Success status but the body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Login succeeded without `token` or `session.access_token`
    #[error("No access token in login response")]
    MissingToken,

    /// Invalid state transition in the session FSM
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// The store was closed while the operation was in flight
    #[error("Session store closed")]
    Closed,

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] burg_storage::StorageError),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,
}

impl AuthError {
    /// Returns true if the request never produced a usable HTTP exchange:
    /// connection failures, timeouts, and interrupted transfers.
    pub fn is_network(&self) -> bool {
        match self {
            AuthError::Timeout => true,
            AuthError::Http(e) => !e.is_decode() && !e.is_builder() && e.status().is_none(),
            _ => false,
        }
    }

    /// Returns true if the backend says the token is no longer valid.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::Unauthorized | AuthError::Rejected { status: 401, .. }
        )
    }

    /// Short message suitable for showing on the login screen.
    pub fn login_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials(message) => message.clone(),
            AuthError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            AuthError::Rejected { .. } | AuthError::Unauthorized => {
                messages::LOGIN_FAILED.to_string()
            }
            AuthError::MalformedResponse(_) => messages::UNREADABLE_RESPONSE.to_string(),
            AuthError::MissingToken => messages::MISSING_TOKEN.to_string(),
            e if e.is_network() => messages::NETWORK_FAILURE.to_string(),
            _ => messages::UNEXPECTED_FAILURE.to_string(),
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_network() {
        assert!(AuthError::Timeout.is_network());
    }

    #[test]
    fn test_rejected_is_not_network() {
        let error = AuthError::Rejected {
            status: 503,
            message: None,
        };
        assert!(!error.is_network());
    }

    #[test]
    fn test_unauthorized_variants() {
        assert!(AuthError::Unauthorized.is_unauthorized());
        assert!(AuthError::Rejected {
            status: 401,
            message: None
        }
        .is_unauthorized());
        assert!(!AuthError::Rejected {
            status: 403,
            message: None
        }
        .is_unauthorized());
    }

    #[test]
    fn test_login_message_uses_server_text() {
        let error = AuthError::Rejected {
            status: 400,
            message: Some("Invalid credentials".to_string()),
        };
        assert_eq!(error.login_message(), "Invalid credentials");
    }

    #[test]
    fn test_login_message_blank_server_text_falls_back() {
        let error = AuthError::Rejected {
            status: 400,
            message: Some("  ".to_string()),
        };
        assert_eq!(error.login_message(), messages::LOGIN_FAILED);
    }

    #[test]
    fn test_login_message_categories() {
        assert_eq!(
            AuthError::MalformedResponse("eof".into()).login_message(),
            messages::UNREADABLE_RESPONSE
        );
        assert_eq!(
            AuthError::MissingToken.login_message(),
            messages::MISSING_TOKEN
        );
        assert_eq!(
            AuthError::Timeout.login_message(),
            messages::NETWORK_FAILURE
        );
        assert_eq!(
            AuthError::InvalidStateTransition("x".into()).login_message(),
            messages::UNEXPECTED_FAILURE
        );
        assert_eq!(AuthError::Closed.login_message(), messages::UNEXPECTED_FAILURE);
    }
}
