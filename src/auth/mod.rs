//! OAuth code exchange, session persistence and observable login state.

pub mod backend;
pub mod controller;
pub mod error;
pub mod manager;
pub mod redirect;
pub mod session;
pub mod store;

pub use backend::{AuthBackend, HttpAuthBackend};
pub use controller::{AuthStateController, AuthUiState};
pub use error::AuthError;
pub use manager::AuthSessionManager;
pub use redirect::RedirectTarget;
pub use session::{AuthSession, AuthSessionPayload};
pub use store::{FileSessionStore, SessionStore, SessionStoreConfig};
