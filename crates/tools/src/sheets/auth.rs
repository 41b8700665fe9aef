//! Bearer tokens for the Sheets API.
//!
//! A static access token works until Google expires it (about an hour).
//! [`RefreshingToken`] trades a long-lived OAuth refresh token for fresh
//! access tokens and caches each one until shortly before it expires.

use homehub_core::error::StoreError;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Tokens are renewed this long before their stated expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// How the store authenticates each request.
pub enum SheetsAuth {
    Static(String),
    Refreshing(RefreshingToken),
}

impl SheetsAuth {
    pub(crate) async fn bearer(&self) -> Result<String, StoreError> {
        match self {
            SheetsAuth::Static(token) => Ok(token.clone()),
            SheetsAuth::Refreshing(source) => source.access_token().await,
        }
    }

    /// Forget a token the API rejected so the next call fetches a new one.
    pub(crate) async fn invalidate(&self) {
        if let SheetsAuth::Refreshing(source) = self {
            source.cached.lock().await.take();
        }
    }
}

struct CachedToken {
    access_token: String,
    renew_at: Instant,
}

/// OAuth 2.0 refresh-token grant against Google's token endpoint.
pub struct RefreshingToken {
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

impl RefreshingToken {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            token_url: DEFAULT_TOKEN_URL.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            client,
            cached: Mutex::new(None),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// A valid access token, fetched only when the cached one is due.
    pub async fn access_token(&self) -> Result<String, StoreError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.renew_at) {
            return Ok(token.access_token.clone());
        }

        let fresh = self.fetch().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_MARGIN);
        debug!(expires_in = fresh.expires_in, "Refreshed Sheets access token");

        let access_token = fresh.access_token;
        *cached = Some(CachedToken {
            access_token: access_token.clone(),
            renew_at: Instant::now() + lifetime,
        });
        Ok(access_token)
    }

    async fn fetch(&self) -> Result<TokenResponse, StoreError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("token refresh failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Token refresh rejected");
            return Err(StoreError::Backend(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Backend(format!("unreadable token response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_used_as_is() {
        let auth = SheetsAuth::Static("ya29.static".into());
        assert_eq!(auth.bearer().await.unwrap(), "ya29.static");
        auth.invalidate().await;
        assert_eq!(auth.bearer().await.unwrap(), "ya29.static");
    }

    #[test]
    fn token_response_defaults_expiry() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"access_token": "ya29.a", "token_type": "Bearer"}"#).unwrap();
        assert_eq!(resp.expires_in, 3600);
    }

    #[tokio::test]
    async fn unreachable_token_endpoint_is_backend_error() {
        let source = RefreshingToken::new("id", "secret", "1//refresh")
            .with_token_url("http://127.0.0.1:9/token");
        let err = source.access_token().await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
