//! CLI entry point for Ares.

pub mod auth;

use clap::{Parser, Subcommand};

/// Ares auth CLI
#[derive(Parser, Debug)]
#[command(name = "ares", version, about = "Ares: OAuth session tooling")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Session management
    Auth(AuthArgs),
    /// Show where navigating to a route would land
    Open(OpenArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Print the URL that starts the OAuth flow
    Url,
    /// Exchange an authorization code for a session
    Login(LoginArgs),
    /// Complete login from a full redirect URI
    Callback(CallbackArgs),
    /// Refresh the stored session
    Refresh,
    /// Show the stored session
    Status,
    /// Remove the stored session
    Logout,
}

/// Arguments for `ares auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Authorization code from the redirect
    pub code: String,
}

/// Arguments for `ares auth callback`.
#[derive(Parser, Debug)]
pub struct CallbackArgs {
    /// Redirect URI, e.g. charliesbotrssapp://oauth?code=...
    pub uri: String,
}

/// Arguments for `ares open`.
#[derive(Parser, Debug)]
pub struct OpenArgs {
    /// Route to open (login, feed)
    pub route: crate::navigation::Route,
}
