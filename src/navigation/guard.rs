use std::sync::Arc;

use super::route::Route;
use super::LoginStatus;
use crate::auth::AuthUiState;

/// Stack-based navigator that redirects protected routes to login.
///
/// The stack is never empty, and after [`on_logout`](Self::on_logout) it holds
/// no route that requires auth. A protected destination requested while
/// logged out is remembered and restored exactly once by
/// [`on_login_succeeded`](Self::on_login_succeeded).
///
/// # Example
/// ```ignore
/// let mut guard = NavigationGuard::new(Route::Login, Route::Login, Route::Feed, status);
/// guard.request_navigate(Route::Feed); // logged out: stays on Login, Feed pending
/// guard.on_login_succeeded();          // now on Feed
/// ```
pub struct NavigationGuard {
    stack: Vec<Route>,
    login_route: Route,
    default_route: Route,
    pending: Option<Route>,
    status: Arc<dyn LoginStatus>,
    last_logged_in: Option<bool>,
}

impl NavigationGuard {
    pub fn new(
        start_route: Route,
        login_route: Route,
        default_route: Route,
        status: Arc<dyn LoginStatus>,
    ) -> Self {
        let mut guard = Self {
            stack: Vec::new(),
            login_route,
            default_route,
            pending: None,
            status,
            last_logged_in: None,
        };
        if start_route.requires_auth() && !guard.status.is_logged_in() {
            guard.pending = Some(start_route);
            guard.stack.push(login_route);
        } else {
            guard.stack.push(start_route);
        }
        guard
    }

    /// Guard with the app's routes: start on the feed, log in via `Login`.
    pub fn with_defaults(status: Arc<dyn LoginStatus>) -> Self {
        Self::new(Route::Feed, Route::Login, Route::Feed, status)
    }

    pub fn current(&self) -> Route {
        // The stack is never empty.
        self.stack.last().copied().unwrap_or(self.login_route)
    }

    pub fn stack(&self) -> &[Route] {
        &self.stack
    }

    pub fn pending_destination(&self) -> Option<Route> {
        self.pending
    }

    /// Navigate to `route`, or redirect to login if it is protected and no
    /// session exists.
    ///
    /// Otherwise `route` is pushed, except when it is already the visible
    /// route: the stack never holds the same route twice in a row.
    pub fn request_navigate(&mut self, route: Route) {
        if route.requires_auth() && !self.status.is_logged_in() {
            tracing::debug!(%route, "redirecting to login");
            self.pending = Some(route);
            self.replace_top(self.login_route);
            return;
        }
        if self.current() != route {
            self.stack.push(route);
        }
    }

    /// Move to the remembered destination, or the default route.
    pub fn on_login_succeeded(&mut self) {
        let destination = self.pending.take().unwrap_or(self.default_route);
        tracing::debug!(%destination, "login succeeded");
        if self.current() == self.login_route {
            self.replace_top(destination);
        } else if self.current() != destination {
            self.stack.push(destination);
        }
        let login_route = self.login_route;
        if destination != login_route && self.stack.len() > 1 {
            self.stack.retain(|r| *r != login_route);
        }
    }

    /// Drop every protected route; fall back to login if nothing remains.
    pub fn on_logout(&mut self) {
        self.pending = None;
        self.stack.retain(|r| !r.requires_auth());
        if self.stack.is_empty() {
            self.stack.push(self.login_route);
        }
    }

    /// Pop the visible route unless it is the last one.
    pub fn go_back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// React to a published auth state: a logged-out to logged-in edge runs
    /// [`on_login_succeeded`](Self::on_login_succeeded), the reverse runs
    /// [`on_logout`](Self::on_logout). Repeated states are ignored.
    pub fn observe(&mut self, state: &AuthUiState) {
        let previous = self.last_logged_in.replace(state.is_logged_in);
        match (previous, state.is_logged_in) {
            (Some(false), true) => self.on_login_succeeded(),
            (Some(true), false) => self.on_logout(),
            _ => {}
        }
    }

    fn replace_top(&mut self, route: Route) {
        self.stack.pop();
        self.stack.push(route);
    }
}
