//! Keeps a [`NavigationGuard`] in step with an [`AuthStateController`].

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::guard::NavigationGuard;
use crate::auth::AuthStateController;

/// Spawn a task feeding every published auth state into
/// [`NavigationGuard::observe`].
///
/// The task ends once the controller is dropped. Abort the returned handle to
/// stop it earlier.
pub fn spawn_auth_bridge(
    guard: Arc<Mutex<NavigationGuard>>,
    controller: &AuthStateController,
) -> JoinHandle<()> {
    let (current, mut events) = controller.snapshot_and_events();
    tokio::spawn(async move {
        guard.lock().await.observe(&current);
        loop {
            match events.recv().await {
                Ok(state) => guard.lock().await.observe(&state),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "navigation bridge fell behind auth state");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!("navigation bridge stopped");
    })
}
