//! Remote token endpoints.

use async_trait::async_trait;
use reqwest::Url;

use super::error::AuthError;
use super::session::AuthSessionPayload;

pub const DEFAULT_AUTH_BASE_URL: &str = "https://rssapp.charliesbot.dev/";

/// Exchanges authorization codes and refresh tokens for session payloads.
///
/// Every failure (transport, non-success status, undecodable body) is
/// returned as [`AuthError::BackendFailure`].
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<AuthSessionPayload, AuthError>;
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSessionPayload, AuthError>;
}

/// [`AuthBackend`] over HTTP: `GET {base}/exchange_token?code=..` and
/// `GET {base}/refresh_token?refresh_token=..`.
///
/// # Example
/// ```no_run
/// use ares::auth::{AuthBackend, HttpAuthBackend};
///
/// # async fn example() -> Result<(), ares::auth::AuthError> {
/// let backend = HttpAuthBackend::new().with_base_url("http://127.0.0.1:8080");
/// let payload = backend.exchange_code("abc123").await?;
/// println!("plan: {}", payload.feedly_plan);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    client: reqwest::Client,
    base_url: String,
}

impl Default for HttpAuthBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpAuthBackend {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_AUTH_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> Result<Url, AuthError> {
        // A base without a trailing slash would make `join` replace its last segment.
        let base = if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        };
        Url::parse(&base)
            .and_then(|url| url.join(name))
            .map_err(|e| AuthError::BackendFailure(format!("Invalid auth base URL: {e}")))
    }

    async fn fetch(
        &self,
        endpoint: &str,
        param: (&str, &str),
        action: &str,
    ) -> Result<AuthSessionPayload, AuthError> {
        let url = self.endpoint(endpoint)?;
        tracing::debug!(%url, "auth backend request");
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(&[param])
            .send()
            .await
            .map_err(|e| failure(action, e))?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = %status, endpoint, "auth backend rejected request");
            let reason = status.canonical_reason().unwrap_or("unexpected status");
            return Err(AuthError::BackendFailure(format!(
                "{action} failed: {} {reason}",
                status.as_u16()
            )));
        }
        resp.json::<AuthSessionPayload>()
            .await
            .map_err(|e| failure(action, e))
    }
}

fn failure(action: &str, error: reqwest::Error) -> AuthError {
    AuthError::BackendFailure(format!("{action} failed: {error}"))
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn exchange_code(&self, code: &str) -> Result<AuthSessionPayload, AuthError> {
        self.fetch("exchange_token", ("code", code), "Token exchange").await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSessionPayload, AuthError> {
        self.fetch(
            "refresh_token",
            ("refresh_token", refresh_token),
            "Token refresh",
        )
        .await
    }
}
