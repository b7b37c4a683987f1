use thiserror::Error;

use crate::error::AresError;

/// Failures surfaced by the session store, the auth backend and the
/// session manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("No session to refresh")]
    NoSession,
    #[error("{0}")]
    BackendFailure(String),
    #[error("Storage error: {0}")]
    StorageFailure(String),
}

impl AuthError {
    pub fn is_backend_failure(&self) -> bool {
        matches!(self, Self::BackendFailure(_))
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::BackendFailure(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::StorageFailure(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::StorageFailure(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::StorageFailure(error.to_string())
    }
}

impl From<AuthError> for AresError {
    fn from(error: AuthError) -> Self {
        AresError::Auth(error)
    }
}
