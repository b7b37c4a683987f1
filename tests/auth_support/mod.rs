#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ares::auth::{
    AuthBackend, AuthError, AuthSession, AuthSessionManager, AuthSessionPayload, SessionStore,
};

#[derive(Default)]
pub struct InMemorySessionStore {
    session: Mutex<Option<AuthSession>>,
    pub writes: AtomicUsize,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, session: AuthSession) {
        *self.session.lock().expect("store lock poisoned") = Some(session);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<AuthSession>, AuthError> {
        Ok(self.session.lock().expect("store lock poisoned").clone())
    }

    fn save(&self, session: &AuthSession) -> Result<(), AuthError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().expect("store lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

/// Store whose every operation fails, for storage fault paths.
pub struct BrokenSessionStore;

impl SessionStore for BrokenSessionStore {
    fn load(&self) -> Result<Option<AuthSession>, AuthError> {
        Err(AuthError::StorageFailure("disk unavailable".to_string()))
    }

    fn save(&self, _session: &AuthSession) -> Result<(), AuthError> {
        Err(AuthError::StorageFailure("disk unavailable".to_string()))
    }

    fn clear(&self) -> Result<(), AuthError> {
        Err(AuthError::StorageFailure("disk unavailable".to_string()))
    }
}

/// Backend replaying queued results and recording the arguments it saw.
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<AuthSessionPayload, AuthError>>>,
    pub calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push(&self, response: Result<AuthSessionPayload, AuthError>) {
        self.responses
            .lock()
            .expect("backend lock poisoned")
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("backend lock poisoned").clone()
    }

    async fn respond(&self, call: String) -> Result<AuthSessionPayload, AuthError> {
        self.calls.lock().expect("backend lock poisoned").push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .expect("backend lock poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::BackendFailure("no scripted response".to_string())))
    }
}

#[async_trait]
impl AuthBackend for ScriptedBackend {
    async fn exchange_code(&self, code: &str) -> Result<AuthSessionPayload, AuthError> {
        self.respond(format!("exchange:{code}")).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSessionPayload, AuthError> {
        self.respond(format!("refresh:{refresh_token}")).await
    }
}

pub fn payload(access: &str, refresh: &str, expires_at: &str, plan: &str) -> AuthSessionPayload {
    AuthSessionPayload {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_in: "3600".to_string(),
        expires_at: expires_at.to_string(),
        feedly_plan: plan.to_string(),
    }
}

pub fn scenario_payload() -> AuthSessionPayload {
    payload("A", "R", "2025-01-01T00:00:00Z", "pro")
}

pub fn manager(
    store: Arc<InMemorySessionStore>,
    backend: Arc<ScriptedBackend>,
) -> Arc<AuthSessionManager> {
    Arc::new(AuthSessionManager::new(store, backend))
}
