//! Ares: auth session core for the Ares feed reader.
//!
//! Handles the OAuth authorization-code exchange, persists the resulting
//! session, refreshes it, and gates navigation to protected routes on the
//! live login state.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ares::prelude::*;
//! use tokio::sync::Mutex;
//!
//! # async fn example() -> ares::error::Result<()> {
//! let config = AresConfig::from_env()?;
//! let manager = Arc::new(config.session_manager());
//! let controller = AuthStateController::restore(manager.clone(), config.callback_queue_capacity);
//! let guard = Arc::new(Mutex::new(NavigationGuard::with_defaults(manager)));
//! let _bridge = ares::navigation::spawn_auth_bridge(guard.clone(), &controller);
//!
//! let code = config.redirect.extract_code("charliesbotrssapp://oauth?code=abc123")?;
//! controller.handle_oauth_callback(code);
//! controller.wait_for_idle().await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod navigation;
pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
