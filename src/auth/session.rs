use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated session persisted between launches.
///
/// `is_expired` is computed from `expires_at` whenever a session is built or
/// loaded; it is never written to storage.
///
/// # Example
/// ```
/// use ares::auth::AuthSession;
///
/// let session = AuthSession::new("access", "refresh", "2099-01-01T00:00:00Z", "pro");
/// assert!(!session.is_expired);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: String,
    pub feedly_plan: String,
    pub is_expired: bool,
}

impl AuthSession {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: impl Into<String>,
        feedly_plan: impl Into<String>,
    ) -> Self {
        let expires_at = expires_at.into();
        let is_expired = expired_at(&expires_at, Utc::now());
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
            feedly_plan: feedly_plan.into(),
            is_expired,
        }
    }

    /// Parsed expiry, if `expires_at` is an RFC 3339 timestamp.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.expires_at)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Whether the session is expired relative to `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        expired_at(&self.expires_at, now)
    }

    /// True when none of the four persisted fields is blank.
    pub fn is_complete(&self) -> bool {
        [
            &self.access_token,
            &self.refresh_token,
            &self.expires_at,
            &self.feedly_plan,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    /// True when the four persisted fields compare equal, ignoring the
    /// derived expiry flag.
    pub fn same_credentials(&self, other: &AuthSession) -> bool {
        self.access_token == other.access_token
            && self.refresh_token == other.refresh_token
            && self.expires_at == other.expires_at
            && self.feedly_plan == other.feedly_plan
    }
}

// Timestamps the backend sends in another format are treated as live.
fn expired_at(expires_at: &str, now: DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc3339(expires_at)
        .map(|ts| ts.with_timezone(&Utc) <= now)
        .unwrap_or(false)
}

/// Token payload returned by the `exchange_token` and `refresh_token`
/// endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSessionPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: String,
    pub expires_at: String,
    pub feedly_plan: String,
}

impl From<AuthSessionPayload> for AuthSession {
    fn from(payload: AuthSessionPayload) -> Self {
        AuthSession::new(
            payload.access_token,
            payload.refresh_token,
            payload.expires_at,
            payload.feedly_plan,
        )
    }
}
