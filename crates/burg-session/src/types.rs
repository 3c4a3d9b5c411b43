//! Wire types for the backend auth endpoints.

use crate::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identity record returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Server-controlled metadata. `role == "admin"` grants admin rights.
    #[serde(default)]
    pub app_metadata: Value,
    #[serde(default)]
    pub user_metadata: Value,
}

impl UserIdentity {
    pub fn is_admin(&self) -> bool {
        self.app_metadata.get("role").and_then(Value::as_str) == Some("admin")
    }
}

/// Opaque session record. Only `access_token` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

impl LoginResponse {
    /// The token to persist: `token` first, then `session.access_token`.
    /// Empty strings do not count.
    pub fn access_token(&self) -> Option<&str> {
        fn non_empty(token: &Option<String>) -> Option<&str> {
            token.as_deref().filter(|token| !token.trim().is_empty())
        }

        non_empty(&self.token).or_else(|| {
            self.session
                .as_ref()
                .and_then(|session| non_empty(&session.access_token))
        })
    }
}

/// Body of `GET /auth/session` and `GET /auth/me`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SessionEnvelope {
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub user: Option<UserIdentity>,
}

/// Error body shape used by the backend on 4xx/5xx.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Email/password pair submitted at login.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Local checks before anything is sent: both fields present and an
    /// email of the form `local@domain.tld`.
    pub fn validate(&self) -> AuthResult<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::InvalidCredentials(
                "Email and password are required".to_string(),
            ));
        }

        if !looks_like_email(self.email.trim()) {
            return Err(AuthError::InvalidCredentials(
                "Enter a valid email address".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_admin_role() {
        let admin: UserIdentity = serde_json::from_value(json!({
            "id": "1",
            "app_metadata": { "role": "admin" }
        }))
        .unwrap();
        assert!(admin.is_admin());

        let member: UserIdentity = serde_json::from_value(json!({
            "id": "2",
            "email": "m@burg.nl",
            "app_metadata": null
        }))
        .unwrap();
        assert!(!member.is_admin());
        assert_eq!(member.email.as_deref(), Some("m@burg.nl"));
    }

    #[test]
    fn test_login_response_prefers_token_field() {
        let response: LoginResponse = serde_json::from_value(json!({
            "token": "T1",
            "session": { "access_token": "T2" }
        }))
        .unwrap();
        assert_eq!(response.access_token(), Some("T1"));
    }

    #[test]
    fn test_login_response_falls_back_to_session_token() {
        let response: LoginResponse = serde_json::from_value(json!({
            "token": "",
            "session": { "access_token": "T2", "expires_in": 3600 }
        }))
        .unwrap();
        assert_eq!(response.access_token(), Some("T2"));
        let session = response.session.unwrap();
        assert_eq!(session.extra["expires_in"], 3600);
    }

    #[test]
    fn test_login_response_without_token() {
        let response: LoginResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.access_token(), None);
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("a@b.co", "pw").validate().is_ok());
        assert!(Credentials::new("", "pw").validate().is_err());
        assert!(Credentials::new("a@b.co", "").validate().is_err());
        assert!(Credentials::new("not-an-email", "pw").validate().is_err());
        assert!(Credentials::new("a@b", "pw").validate().is_err());
        assert!(Credentials::new("a b@c.nl", "pw").validate().is_err());
        assert!(Credentials::new("@c.nl", "pw").validate().is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("a@b.co", "hunter2"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("a@b.co"));
    }
}
