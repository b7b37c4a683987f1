//! Route stack with login gating.

pub mod bridge;
pub mod guard;
pub mod route;

pub use bridge::spawn_auth_bridge;
pub use guard::NavigationGuard;
pub use route::Route;

/// Answers whether a usable session exists right now.
pub trait LoginStatus: Send + Sync {
    fn is_logged_in(&self) -> bool;
}
