//! Convenience re-exports for common use.

pub use crate::auth::{
    AuthBackend, AuthError, AuthSession, AuthSessionManager, AuthStateController, AuthUiState,
    SessionStore,
};
pub use crate::config::AresConfig;
pub use crate::error::{AresError, Result};
pub use crate::navigation::{NavigationGuard, Route};
