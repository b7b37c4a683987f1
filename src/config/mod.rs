//! Configuration (layered: defaults < `.env` < process environment).

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::backend::DEFAULT_AUTH_BASE_URL;
use crate::auth::controller::DEFAULT_QUEUE_CAPACITY;
use crate::auth::{
    AuthSessionManager, FileSessionStore, HttpAuthBackend, RedirectTarget, SessionStoreConfig,
};
use crate::error::AresError;

pub const DEFAULT_AUTHORIZE_URL: &str = "https://rssapp.charliesbot.dev/oauth";

/// Runtime settings for the auth core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AresConfig {
    /// Base URL of the token exchange service.
    pub auth_base_url: String,
    /// Page the user is sent to in order to grant access.
    pub authorize_url: String,
    /// Where the authorization server redirects back to.
    pub redirect: RedirectTarget,
    /// Directory holding `session.toml`.
    pub session_dir: PathBuf,
    /// Pending callbacks a controller accepts before rejecting new ones.
    pub callback_queue_capacity: usize,
}

impl Default for AresConfig {
    fn default() -> Self {
        Self {
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            redirect: RedirectTarget::default(),
            session_dir: SessionStoreConfig::default_dir(),
            callback_queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl AresConfig {
    /// Load from environment variables (`ARES_AUTH_BASE_URL`,
    /// `ARES_AUTHORIZE_URL`, `ARES_SESSION_DIR`, `ARES_CALLBACK_QUEUE`,
    /// `ARES_REDIRECT_SCHEME`, `ARES_REDIRECT_HOST`), reading `.env` first.
    pub fn from_env() -> Result<Self, AresError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AresError> {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("ARES_AUTH_BASE_URL") {
            config.auth_base_url = url;
        }
        if let Some(url) = var("ARES_AUTHORIZE_URL") {
            config.authorize_url = url;
        }
        if let Some(dir) = var("ARES_SESSION_DIR") {
            config.session_dir = PathBuf::from(dir);
        }
        if let Some(scheme) = var("ARES_REDIRECT_SCHEME") {
            config.redirect.scheme = scheme;
        }
        if let Some(host) = var("ARES_REDIRECT_HOST") {
            config.redirect.host = host;
        }
        if let Some(raw) = var("ARES_CALLBACK_QUEUE") {
            config.callback_queue_capacity = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(AresError::Configuration(format!(
                        "ARES_CALLBACK_QUEUE must be a positive integer, got {raw:?}"
                    )))
                }
            };
        }
        Ok(config)
    }

    pub fn session_store(&self) -> FileSessionStore {
        FileSessionStore::new(SessionStoreConfig::new(self.session_dir.clone()))
    }

    pub fn http_backend(&self) -> HttpAuthBackend {
        HttpAuthBackend::new().with_base_url(self.auth_base_url.clone())
    }

    /// Session manager wired to the file store and HTTP backend.
    pub fn session_manager(&self) -> AuthSessionManager {
        AuthSessionManager::new(Arc::new(self.session_store()), Arc::new(self.http_backend()))
    }
}
