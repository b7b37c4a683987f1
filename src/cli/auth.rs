//! CLI command handlers for the auth and navigation subcommands.

use std::sync::Arc;

use crate::auth::{AuthSession, AuthStateController};
use crate::config::AresConfig;
use crate::error::{AresError, Result};
use crate::navigation::{NavigationGuard, Route};

/// Handle `ares auth url`.
pub fn handle_url(config: &AresConfig) -> Result<()> {
    println!("{}", config.authorize_url);
    println!(
        "After granting access, run: ares auth callback '{}://{}?code=...'",
        config.redirect.scheme, config.redirect.host
    );
    Ok(())
}

/// Handle `ares auth login <code>`.
pub async fn handle_login(config: &AresConfig, code: &str) -> Result<()> {
    let session = config.session_manager().login(code).await?;
    println!("✅ Logged in");
    print_session(&session);
    Ok(())
}

/// Handle `ares auth callback <uri>`: runs the code through the same
/// controller the app uses and reports its final state.
pub async fn handle_callback(config: &AresConfig, uri: &str) -> Result<()> {
    let code = config.redirect.extract_code(uri)?;
    let manager = Arc::new(config.session_manager());
    let controller = AuthStateController::new(manager.clone(), config.callback_queue_capacity);
    controller.handle_oauth_callback(code);
    controller.wait_for_idle().await;

    let state = controller.state();
    if let Some(message) = state.error_message {
        return Err(AresError::Login(message));
    }
    println!("✅ Logged in");
    if let Some(session) = manager.current_session()? {
        print_session(&session);
    }
    Ok(())
}

/// Handle `ares auth refresh`.
pub async fn handle_refresh(config: &AresConfig) -> Result<()> {
    let session = config.session_manager().refresh_token().await?;
    println!("✅ Session refreshed");
    print_session(&session);
    Ok(())
}

/// Handle `ares auth status`.
pub fn handle_status(config: &AresConfig) -> Result<()> {
    match config.session_manager().current_session()? {
        Some(session) => {
            println!("Logged in");
            print_session(&session);
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

/// Handle `ares auth logout`.
pub fn handle_logout(config: &AresConfig) -> Result<()> {
    config.session_manager().logout()?;
    println!("✅ Logged out");
    Ok(())
}

/// Handle `ares open <route>`.
pub fn handle_open(config: &AresConfig, route: Route) -> Result<()> {
    let manager = Arc::new(config.session_manager());
    let mut guard = NavigationGuard::new(Route::Login, Route::Login, Route::Feed, manager);
    guard.request_navigate(route);
    println!("Showing: {}", guard.current());
    if let Some(pending) = guard.pending_destination() {
        println!("Login required; will continue to {pending} afterwards");
    }
    Ok(())
}

fn print_session(session: &AuthSession) {
    println!("   Plan: {}", session.feedly_plan);
    let expiry = if session.is_expired { " (expired)" } else { "" };
    println!("   Expires: {}{expiry}", session.expires_at);
}
