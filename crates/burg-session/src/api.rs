//! Backend REST client for the `/auth/*` endpoints.
//!
//! Every call is bounded by a timeout. Tokens are sent as
//! `Authorization: Bearer <token>` and never logged.

use crate::types::{Credentials, ErrorBody, LoginResponse, SessionEnvelope};
use crate::{AuthError, AuthResult};
use burg_config::Config;
use reqwest::{Response, StatusCode};
use std::future::Future;
use std::time::Duration;

/// HTTP client for the authentication endpoints.
#[derive(Clone)]
pub struct AuthApi {
    http_client: reqwest::Client,
    api_url: String,
    request_timeout: Duration,
}

impl AuthApi {
    /// Create a client for `api_url` (e.g. `https://burg-dashboard.nl/api`).
    pub fn new(api_url: impl Into<String>, request_timeout: Duration) -> AuthResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("burg/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    pub fn from_config(config: &Config) -> AuthResult<Self> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/{}", self.api_url, endpoint)
    }

    /// `POST /auth/login`.
    ///
    /// Non-2xx responses become [`AuthError::Rejected`] carrying the body's
    /// `error` text when present. A 2xx body that is not JSON becomes
    /// [`AuthError::MalformedResponse`].
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<LoginResponse> {
        let url = self.auth_url("login");
        tracing::debug!(url = %url, "Sending login request");

        let body = bounded(self.request_timeout, async {
            let response = self
                .http_client
                .post(&url)
                .header("Accept", "application/json")
                .json(credentials)
                .send()
                .await?;
            let response = reject_failure(response).await?;
            Ok::<_, AuthError>(response.text().await?)
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| AuthError::MalformedResponse(e.to_string()))
    }

    /// `GET /auth/session`, bounded by `limit` instead of the request timeout.
    ///
    /// Any 2xx counts as a valid token. The body is decoded best-effort and
    /// an unreadable body yields an empty envelope.
    pub async fn check_session(
        &self,
        access_token: &str,
        limit: Duration,
    ) -> AuthResult<SessionEnvelope> {
        let url = self.auth_url("session");
        tracing::debug!(url = %url, "Checking session");

        let body = bounded(limit, async {
            let response = self.get_with_token(&url, access_token).await?;
            let response = reject_failure(response).await?;
            Ok::<_, AuthError>(response.text().await.unwrap_or_default())
        })
        .await?;

        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Session check body not decodable, ignoring");
            SessionEnvelope::default()
        }))
    }

    /// `GET /auth/me`. HTTP 401 becomes [`AuthError::Unauthorized`].
    pub async fn current_user(&self, access_token: &str) -> AuthResult<SessionEnvelope> {
        let url = self.auth_url("me");
        tracing::debug!(url = %url, "Fetching current user");

        let body = bounded(self.request_timeout, async {
            let response = self.get_with_token(&url, access_token).await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                return Err(AuthError::Unauthorized);
            }
            let response = reject_failure(response).await?;
            Ok::<_, AuthError>(response.text().await?)
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| AuthError::MalformedResponse(e.to_string()))
    }

    /// `POST /auth/logout`.
    pub async fn logout(&self, access_token: &str) -> AuthResult<()> {
        let url = self.auth_url("logout");
        tracing::debug!(url = %url, "Sending logout request");

        bounded(self.request_timeout, async {
            let response = self
                .http_client
                .post(&url)
                .header("Authorization", format!("Bearer {}", access_token))
                .send()
                .await?;
            reject_failure(response).await?;
            Ok::<_, AuthError>(())
        })
        .await
    }

    async fn get_with_token(&self, url: &str, access_token: &str) -> AuthResult<Response> {
        Ok(self
            .http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Accept", "application/json")
            .send()
            .await?)
    }
}

/// Run `request`, failing with [`AuthError::Timeout`] once `limit` elapses.
async fn bounded<T, F>(limit: Duration, request: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    tokio::time::timeout(limit, request)
        .await
        .map_err(|_| AuthError::Timeout)?
}

/// Pass 2xx responses through, turn anything else into [`AuthError::Rejected`].
async fn reject_failure(response: Response) -> AuthResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.error);

    tracing::warn!(status = %status, body_len = body.len(), "Auth request rejected");

    Err(AuthError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_url_strips_trailing_slash() {
        let api = AuthApi::new("http://localhost:3000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.auth_url("login"), "http://localhost:3000/api/auth/login");
    }

    #[test]
    fn test_from_config_uses_request_timeout() {
        let mut config = Config::default();
        config.request_timeout_ms = 1234;
        let api = AuthApi::from_config(&config).unwrap();
        assert_eq!(api.request_timeout, Duration::from_millis(1234));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: AuthResult<()> = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(AuthError::Timeout)));
    }
}
