//! Login result reported to the caller.

use serde::{Serialize, Serializer};

/// Messages shown on the login screen.
pub mod messages {
    pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
    pub const UNREADABLE_RESPONSE: &str = "Could not process the server response.";
    pub const MISSING_TOKEN: &str = "No access token received.";
    pub const NETWORK_FAILURE: &str =
        "Could not reach the server. Check your connection and try again.";
    pub const UNEXPECTED_FAILURE: &str = "An unexpected error occurred.";
}

/// Result of [`SessionStore::login`](crate::SessionStore::login).
///
/// Serializes as `{"success": true}` or `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    Failed { error: String },
}

impl LoginOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        LoginOutcome::Failed {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoginOutcome::Success => None,
            LoginOutcome::Failed { error } => Some(error),
        }
    }
}

impl Serialize for LoginOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            success: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
        }

        Wire {
            success: self.is_success(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_wire_shape() {
        assert_eq!(
            serde_json::to_value(LoginOutcome::Success).unwrap(),
            json!({ "success": true })
        );
        assert_eq!(
            serde_json::to_value(LoginOutcome::failed("nope")).unwrap(),
            json!({ "success": false, "error": "nope" })
        );
    }
}
