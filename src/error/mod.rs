//! Error types for Ares.

use thiserror::Error;

use crate::auth::AuthError;

/// Top-level error for configuration and command handling.
#[derive(Error, Debug)]
pub enum AresError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Auth(AuthError),

    #[error("Login failed: {0}")]
    Login(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AresError {
    /// Whether re-running the login flow is the way to recover.
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::Auth(AuthError::NoSession))
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 78,
            Self::Login(_) => 1,
            Self::Auth(AuthError::InvalidArgument(_)) => 64,
            Self::Auth(AuthError::NoSession) => 3,
            Self::Auth(AuthError::BackendFailure(_)) => 69,
            Self::Auth(AuthError::StorageFailure(_)) | Self::Io(_) => 74,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AresError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_convert_and_keep_their_message() {
        let err: AresError = AuthError::BackendFailure("Token exchange failed: 500".into()).into();
        assert_eq!(err.to_string(), "Token exchange failed: 500");
        assert_eq!(err.exit_code(), 69);
    }

    #[test]
    fn missing_session_asks_for_login() {
        let err: AresError = AuthError::NoSession.into();
        assert!(err.needs_login());
        assert!(!AresError::Configuration("x".into()).needs_login());
    }
}
