//! Observable login state driven by inbound OAuth callbacks.
//!
//! [`AuthStateController`] owns an [`AuthUiState`] published through a
//! [`watch`] channel (latest value) and a [`broadcast`] channel (every
//! transition, in order). Callbacks are queued onto a single worker task, so
//! state transitions are applied strictly in the order they were requested:
//! - [`AuthStateController::handle_oauth_callback`]: exchange a code
//! - [`AuthStateController::sign_out`]: clear the stored session
//! - [`AuthStateController::clear_error`]: dismiss the last error

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::manager::AuthSessionManager;
use crate::navigation::LoginStatus;

pub const DEFAULT_QUEUE_CAPACITY: usize = 8;
const EVENT_BUFFER: usize = 64;

/// UI-facing authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthUiState {
    pub is_loading: bool,
    pub is_logged_in: bool,
    pub error_message: Option<String>,
}

#[derive(Debug)]
enum Command {
    Login { code: String, request_id: Uuid },
    Logout { request_id: Uuid },
}

impl Command {
    fn request_id(&self) -> Uuid {
        match self {
            Self::Login { request_id, .. } | Self::Logout { request_id } => *request_id,
        }
    }
}

/// Writes a state transition to both channels under the watch lock, so the
/// broadcast order always matches the watch order.
struct StatePublisher {
    state_tx: watch::Sender<AuthUiState>,
    events_tx: broadcast::Sender<AuthUiState>,
}

impl StatePublisher {
    fn update(&self, modify: impl FnOnce(&mut AuthUiState)) {
        self.state_tx.send_modify(|state| {
            modify(state);
            let _ = self.events_tx.send(state.clone());
        });
    }
}

/// Drives the code-exchange use case and exposes its progress.
///
/// Must be created inside a Tokio runtime. Dropping the controller cancels
/// its worker; a login still in flight is abandoned before anything is
/// written to the session store.
///
/// # Example
///
/// ```ignore
/// let controller = AuthStateController::new(manager, DEFAULT_QUEUE_CAPACITY);
/// let mut states = controller.subscribe();
/// controller.handle_oauth_callback("abc123");
/// controller.wait_for_idle().await;
/// assert!(states.borrow_and_update().is_logged_in);
/// ```
pub struct AuthStateController {
    publisher: Arc<StatePublisher>,
    commands: mpsc::Sender<Command>,
    in_flight: Arc<AtomicUsize>,
    idle_notify: Arc<Notify>,
    cancel: CancellationToken,
    worker: JoinHandle<()>,
}

impl AuthStateController {
    /// Create a controller starting from the default (logged out) state.
    pub fn new(manager: Arc<AuthSessionManager>, queue_capacity: usize) -> Self {
        Self::with_state(manager, queue_capacity, AuthUiState::default())
    }

    /// Create a controller whose `is_logged_in` reflects the persisted session.
    pub fn restore(manager: Arc<AuthSessionManager>, queue_capacity: usize) -> Self {
        let initial = AuthUiState {
            is_logged_in: LoginStatus::is_logged_in(&*manager),
            ..AuthUiState::default()
        };
        Self::with_state(manager, queue_capacity, initial)
    }

    fn with_state(
        manager: Arc<AuthSessionManager>,
        queue_capacity: usize,
        initial: AuthUiState,
    ) -> Self {
        let (state_tx, _) = watch::channel(initial);
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
        let publisher = Arc::new(StatePublisher {
            state_tx,
            events_tx,
        });
        let (commands, rx) = mpsc::channel(queue_capacity.max(1));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let idle_notify = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let worker = tokio::spawn(run_worker(Worker {
            manager,
            publisher: publisher.clone(),
            commands: rx,
            in_flight: in_flight.clone(),
            idle_notify: idle_notify.clone(),
            cancel: cancel.clone(),
        }));

        Self {
            publisher,
            commands,
            in_flight,
            idle_notify,
            cancel,
            worker,
        }
    }

    /// Current state.
    pub fn state(&self) -> AuthUiState {
        self.publisher.state_tx.borrow().clone()
    }

    /// Subscribe to the latest state. The receiver sees the current value
    /// immediately; intermediate values may be skipped under load.
    pub fn subscribe(&self) -> watch::Receiver<AuthUiState> {
        self.publisher.state_tx.subscribe()
    }

    /// Subscribe to every transition published from now on, in order.
    pub fn events(&self) -> broadcast::Receiver<AuthUiState> {
        self.publisher.events_tx.subscribe()
    }

    /// Current state together with a receiver for every later transition.
    ///
    /// Both are taken under the watch lock, so no transition is missed or
    /// replayed between the snapshot and the first received event.
    pub fn snapshot_and_events(&self) -> (AuthUiState, broadcast::Receiver<AuthUiState>) {
        let state = self.publisher.state_tx.borrow();
        let events = self.publisher.events_tx.subscribe();
        (state.clone(), events)
    }

    /// Queue an authorization-code exchange.
    ///
    /// Returns immediately; progress is reported through the state channel.
    pub fn handle_oauth_callback(&self, code: impl Into<String>) {
        self.submit(Command::Login {
            code: code.into(),
            request_id: Uuid::new_v4(),
        });
    }

    /// Queue a logout. On success `is_logged_in` becomes false.
    pub fn sign_out(&self) {
        self.submit(Command::Logout {
            request_id: Uuid::new_v4(),
        });
    }

    /// Dismiss the current error message; other fields are untouched.
    pub fn clear_error(&self) {
        self.publisher.update(|state| state.error_message = None);
    }

    /// Wait until every queued command has finished.
    pub async fn wait_for_idle(&self) {
        loop {
            let notified = self.idle_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn submit(&self, command: Command) {
        let request_id = command.request_id();
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let Err(err) = self.commands.try_send(command) else {
            tracing::debug!(%request_id, "auth command queued");
            return;
        };
        finish_one(&self.in_flight, &self.idle_notify);
        let message = match err {
            TrySendError::Full(_) => "Too many pending login requests",
            TrySendError::Closed(_) => "Login is no longer available",
        };
        tracing::warn!(%request_id, "auth command rejected: {message}");
        self.publisher
            .update(|state| state.error_message = Some(message.to_string()));
    }
}

impl Drop for AuthStateController {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.worker.abort();
    }
}

struct Worker {
    manager: Arc<AuthSessionManager>,
    publisher: Arc<StatePublisher>,
    commands: mpsc::Receiver<Command>,
    in_flight: Arc<AtomicUsize>,
    idle_notify: Arc<Notify>,
    cancel: CancellationToken,
}

async fn run_worker(mut worker: Worker) {
    loop {
        let command = tokio::select! {
            _ = worker.cancel.cancelled() => break,
            command = worker.commands.recv() => match command {
                Some(command) => command,
                None => break,
            },
        };
        let span = tracing::debug_span!("auth_command", request_id = %command.request_id());
        tokio::select! {
            _ = worker.cancel.cancelled() => break,
            _ = execute(&worker.manager, &worker.publisher, command).instrument(span) => {}
        }
        finish_one(&worker.in_flight, &worker.idle_notify);
    }
    tracing::debug!("auth worker stopped");
}

async fn execute(
    manager: &AuthSessionManager,
    publisher: &StatePublisher,
    command: Command,
) {
    match command {
        Command::Login { code, .. } => {
            publisher.update(|state| {
                state.is_loading = true;
                state.error_message = None;
            });
            match manager.login(&code).await {
                Ok(_) => publisher.update(|state| {
                    state.is_loading = false;
                    state.is_logged_in = true;
                }),
                Err(e) => publisher.update(|state| {
                    state.is_loading = false;
                    state.error_message = Some(e.to_string());
                }),
            }
        }
        Command::Logout { .. } => match manager.logout() {
            Ok(()) => publisher.update(|state| {
                state.is_logged_in = false;
                state.error_message = None;
            }),
            Err(e) => publisher.update(|state| state.error_message = Some(e.to_string())),
        },
    }
}

fn finish_one(in_flight: &AtomicUsize, idle_notify: &Notify) {
    if in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
        idle_notify.notify_waiters();
    }
}
