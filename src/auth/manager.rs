use std::sync::Arc;

use super::backend::AuthBackend;
use super::error::AuthError;
use super::session::{AuthSession, AuthSessionPayload};
use super::store::SessionStore;
use crate::navigation::LoginStatus;

/// Single source of truth for the persisted auth session.
///
/// Every operation returns a `Result`; failures are never swallowed. The
/// store is written only after the backend has returned a complete payload,
/// so a failed or cancelled exchange leaves any prior session untouched.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use ares::auth::{AuthSessionManager, FileSessionStore, HttpAuthBackend};
///
/// # async fn example() -> Result<(), ares::auth::AuthError> {
/// let manager = AuthSessionManager::new(
///     Arc::new(FileSessionStore::new_default()),
///     Arc::new(HttpAuthBackend::new()),
/// );
/// let session = manager.login("abc123").await?;
/// assert!(manager.is_logged_in()?);
/// # let _ = session;
/// # Ok(())
/// # }
/// ```
pub struct AuthSessionManager {
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn AuthBackend>,
}

impl AuthSessionManager {
    pub fn new(store: Arc<dyn SessionStore>, backend: Arc<dyn AuthBackend>) -> Self {
        Self { store, backend }
    }

    /// Exchange an authorization code for a session and persist it.
    pub async fn login(&self, code: &str) -> Result<AuthSession, AuthError> {
        if code.trim().is_empty() {
            return Err(AuthError::InvalidArgument(
                "Authorization code cannot be empty".to_string(),
            ));
        }
        let payload = self.backend.exchange_code(code).await.map_err(|e| {
            tracing::warn!(error = %e, "authorization code exchange failed");
            e
        })?;
        let session = complete_session(payload, "Token exchange")?;
        self.store.save(&session)?;
        tracing::debug!(plan = %session.feedly_plan, "logged in");
        Ok(session)
    }

    /// Renew the stored session using its refresh token.
    pub async fn refresh_token(&self) -> Result<AuthSession, AuthError> {
        let current = self.store.load()?.ok_or(AuthError::NoSession)?;
        let payload = self
            .backend
            .refresh(&current.refresh_token)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "session refresh failed");
                e
            })?;
        let session = complete_session(payload, "Token refresh")?;
        self.store.save(&session)?;
        tracing::debug!("session refreshed");
        Ok(session)
    }

    /// Stored session, refreshed first if it has expired.
    pub async fn valid_session(&self) -> Result<AuthSession, AuthError> {
        match self.store.load()? {
            Some(session) if session.is_expired => self.refresh_token().await,
            Some(session) => Ok(session),
            None => Err(AuthError::NoSession),
        }
    }

    pub fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        self.store.load()
    }

    pub fn is_logged_in(&self) -> Result<bool, AuthError> {
        self.store.is_logged_in()
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear()?;
        tracing::debug!("logged out");
        Ok(())
    }
}

// A payload with a blank field would be stored but never load back.
fn complete_session(payload: AuthSessionPayload, action: &str) -> Result<AuthSession, AuthError> {
    let session = AuthSession::from(payload);
    if session.is_complete() {
        Ok(session)
    } else {
        tracing::warn!(action, "backend returned an incomplete session payload");
        Err(AuthError::BackendFailure(format!("{action} failed: incomplete session payload")))
    }
}

impl LoginStatus for AuthSessionManager {
    fn is_logged_in(&self) -> bool {
        // A store that cannot be read cannot vouch for a session.
        AuthSessionManager::is_logged_in(self).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read session; treating as logged out");
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{FileSessionStore, SessionStoreConfig};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FixedBackend {
        calls: AtomicUsize,
        result: Result<AuthSessionPayload, AuthError>,
    }

    #[async_trait]
    impl AuthBackend for FixedBackend {
        async fn exchange_code(&self, _code: &str) -> Result<AuthSessionPayload, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<AuthSessionPayload, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn payload() -> AuthSessionPayload {
        AuthSessionPayload {
            access_token: "A".to_string(),
            refresh_token: "R".to_string(),
            expires_in: "3600".to_string(),
            expires_at: "2999-01-01T00:00:00Z".to_string(),
            feedly_plan: "pro".to_string(),
        }
    }

    fn manager_with(
        result: Result<AuthSessionPayload, AuthError>,
    ) -> (TempDir, Arc<FixedBackend>, AuthSessionManager) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileSessionStore::new(SessionStoreConfig::new(
            dir.path().to_path_buf(),
        )));
        let backend = Arc::new(FixedBackend {
            calls: AtomicUsize::new(0),
            result,
        });
        let manager = AuthSessionManager::new(store, backend.clone());
        (dir, backend, manager)
    }

    #[tokio::test]
    async fn blank_code_fails_without_backend_call() {
        let (_dir, backend, manager) = manager_with(Ok(payload()));
        let err = manager.login("   ").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument(_)));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(!manager.is_logged_in().unwrap());
    }

    #[tokio::test]
    async fn login_persists_session() {
        let (_dir, _backend, manager) = manager_with(Ok(payload()));
        let session = manager.login("abc123").await.unwrap();
        assert_eq!(session.access_token, "A");
        assert!(manager.is_logged_in().unwrap());
        assert!(LoginStatus::is_logged_in(&manager));
    }

    #[tokio::test]
    async fn refresh_without_session_is_no_session() {
        let (_dir, backend, manager) = manager_with(Ok(payload()));
        let err = manager.refresh_token().await.unwrap_err();
        assert_eq!(err, AuthError::NoSession);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_session_without_session_is_no_session() {
        let (_dir, _backend, manager) = manager_with(Ok(payload()));
        assert_eq!(manager.valid_session().await.unwrap_err(), AuthError::NoSession);
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let (_dir, _backend, manager) = manager_with(Ok(payload()));
        manager.login("abc123").await.unwrap();
        manager.logout().unwrap();
        assert!(manager.current_session().unwrap().is_none());
        assert!(!manager.is_logged_in().unwrap());
    }
}
