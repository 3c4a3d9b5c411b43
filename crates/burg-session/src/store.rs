//! Session store: the single owner of the persisted token and the
//! in-memory identity.
//!
//! Operations are serialized: at most one of initialize, login, logout,
//! refresh or clear runs at a time, so a logout can never interleave with
//! a login that is still waiting on the network. Observers follow changes
//! through a [`watch`] channel.

use crate::auth_fsm::{AuthState, SessionMachine, SessionMachineInput};
use crate::outcome::LoginOutcome;
use crate::types::{Credentials, LoginResponse, Session, SessionEnvelope, UserIdentity};
use crate::{AuthApi, AuthError, AuthResult};
use burg_config::Config;
use burg_storage::{KeyValueStore, TokenVault};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Authentication session store.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: AuthApi,
    vault: TokenVault,
    session_check_timeout: Duration,
    startup_retry_delay: Duration,
    core: Mutex<SessionCore>,
    state_tx: watch::Sender<AuthState>,
    op_lock: tokio::sync::Mutex<()>,
    closed: AtomicBool,
    startup_retry: Mutex<Option<JoinHandle<()>>>,
}

/// In-memory session data, guarded together with the machine so the
/// published [`AuthState`] is always computed from a consistent snapshot.
struct SessionCore {
    machine: SessionMachine,
    user: Option<UserIdentity>,
    session: Option<Session>,
    token_only_email: Option<String>,
}

impl SessionCore {
    fn new() -> Self {
        Self {
            machine: SessionMachine::new(),
            user: None,
            session: None,
            token_only_email: None,
        }
    }

    fn reset(&mut self) {
        self.user = None;
        self.session = None;
        self.token_only_email = None;
    }

    fn public_state(&self) -> AuthState {
        AuthState::resolve(
            self.machine.state(),
            self.user.as_ref(),
            self.token_only_email.as_deref(),
        )
    }
}

impl SessionStore {
    /// Create a store talking to `config.api_base_url` and persisting into
    /// `storage`.
    pub fn new(config: &Config, storage: Arc<dyn KeyValueStore>) -> AuthResult<Self> {
        let api = AuthApi::from_config(config)?;
        Ok(Self::with_api(api, TokenVault::new(storage), config))
    }

    /// Create a store with a prebuilt API client.
    pub fn with_api(api: AuthApi, vault: TokenVault, config: &Config) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Uninitialized);

        Self {
            inner: Arc::new(Inner {
                api,
                vault,
                session_check_timeout: config.session_check_timeout(),
                startup_retry_delay: config.startup_retry_delay(),
                core: Mutex::new(SessionCore::new()),
                state_tx,
                op_lock: tokio::sync::Mutex::new(()),
                closed: AtomicBool::new(false),
                startup_retry: Mutex::new(None),
            }),
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Current authentication state.
    pub fn state(&self) -> AuthState {
        self.inner.state_tx.borrow().clone()
    }

    /// Subscribe to state changes. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state_tx.subscribe()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.inner.core.lock().user.clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.core.lock().session.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.state().is_admin()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    /// The persisted access token, if any.
    pub fn access_token(&self) -> AuthResult<Option<String>> {
        Ok(self.inner.vault.access_token()?)
    }

    /// Stop applying results. In-flight requests finish but no longer
    /// mutate state, and the pending startup retry is cancelled.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.inner.startup_retry.lock().take() {
            handle.abort();
        }
        debug!("Session store closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Establish the startup state from the persisted token.
    ///
    /// Runs once; later calls are ignored. Leaves the loading state exactly
    /// once, within the session check timeout.
    pub async fn initialize(&self) {
        let _op = self.inner.op_lock.lock().await;
        if self.is_closed() {
            return;
        }

        if let Err(e) = self.transition(&SessionMachineInput::Initialize) {
            warn!(error = %e, "Session store already initialized");
            return;
        }

        let token = match self.inner.vault.access_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                info!("No stored access token");
                self.wipe();
                self.advance(&SessionMachineInput::NoToken);
                return;
            }
            Err(e) => {
                error!(error = %e, "Failed to read stored access token");
                self.wipe();
                self.advance(&SessionMachineInput::CheckFailed);
                return;
            }
        };

        let result = self
            .inner
            .api
            .check_session(&token, self.inner.session_check_timeout)
            .await;

        if self.is_closed() {
            debug!("Discarding session check result after close");
            return;
        }

        match result {
            Ok(envelope) => {
                let input = self.adopt_startup(envelope);
                self.advance(&input);
            }
            Err(e) if e.is_network() => {
                warn!(error = %e, "Session check failed, signing out and retrying later");
                self.wipe();
                self.advance(&SessionMachineInput::CheckFailed);
                self.schedule_startup_retry();
            }
            Err(e) => {
                info!(error = %e, "Stored session rejected");
                self.wipe();
                self.advance(&SessionMachineInput::SessionRejected);
            }
        }
    }

    /// Exchange credentials for a session.
    ///
    /// Any previous session is cleared first. On failure the store ends
    /// unauthenticated with nothing persisted.
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let _op = self.inner.op_lock.lock().await;
        if self.is_closed() {
            return LoginOutcome::failed(AuthError::Closed.login_message());
        }

        info!(email = %email, "Login attempt");
        self.advance(&SessionMachineInput::LoginAttempt);
        self.wipe();

        let credentials = Credentials::new(email.trim(), password);
        match self.try_login(&credentials).await {
            Ok(()) => LoginOutcome::Success,
            Err(e) => {
                warn!(error = %e, "Login failed");
                if !self.is_closed() {
                    self.wipe();
                    self.advance(&SessionMachineInput::LoginFailed);
                }
                LoginOutcome::failed(e.login_message())
            }
        }
    }

    async fn try_login(&self, credentials: &Credentials) -> AuthResult<()> {
        let response = self.inner.api.login(credentials).await?;
        if self.is_closed() {
            return Err(AuthError::Closed);
        }

        let token = response
            .access_token()
            .ok_or(AuthError::MissingToken)?
            .to_string();
        self.inner.vault.set_access_token(&token)?;

        let LoginResponse { session, user, .. } = response;
        let input = {
            let mut core = self.inner.core.lock();
            core.session = session;
            match user {
                Some(user) => {
                    info!(user_id = %user.id, "Login succeeded");
                    core.user = Some(user);
                    SessionMachineInput::LoginSucceeded
                }
                None => {
                    info!("Login succeeded without identity");
                    core.token_only_email = Some(credentials.email.clone());
                    SessionMachineInput::LoginTokenOnly
                }
            }
        };
        self.advance(&input);

        Ok(())
    }

    /// End the session. Local state is cleared whatever the backend says.
    pub async fn logout(&self) {
        let _op = self.inner.op_lock.lock().await;
        if self.is_closed() {
            return;
        }

        let token = self.inner.vault.access_token().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read access token for logout");
            None
        });

        self.advance(&SessionMachineInput::LogoutRequested);

        if let Some(token) = token {
            match self.inner.api.logout(&token).await {
                Ok(()) => debug!("Backend logout acknowledged"),
                Err(e) => warn!(error = %e, "Backend logout failed, clearing local session anyway"),
            }
        }

        self.wipe();
        self.advance(&SessionMachineInput::LogoutComplete);
        info!("Logged out");
    }

    /// Re-fetch the identity for the stored token.
    ///
    /// A 401 signs out. Other failures leave the state as it is.
    pub async fn refresh_user(&self) {
        let _op = self.inner.op_lock.lock().await;
        if self.is_closed() {
            return;
        }

        let token = match self.inner.vault.access_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No access token to refresh, clearing session");
                self.wipe();
                self.advance(&SessionMachineInput::Cleared);
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read access token for refresh");
                return;
            }
        };

        let result = self.inner.api.current_user(&token).await;
        if self.is_closed() {
            debug!("Discarding refresh result after close");
            return;
        }

        match result {
            Ok(envelope) => self.adopt_refresh(envelope),
            Err(e) if e.is_unauthorized() => {
                info!("Access token rejected, signing out");
                self.wipe();
                self.advance(&SessionMachineInput::TokenRejected);
            }
            Err(e) => warn!(error = %e, "Failed to refresh user, keeping current state"),
        }
    }

    /// Remove every persisted auth artifact and reset to unauthenticated.
    ///
    /// Keys the store does not own are left alone.
    pub async fn clear_auth_data(&self) {
        let _op = self.inner.op_lock.lock().await;
        if self.is_closed() {
            return;
        }

        self.wipe();
        self.advance(&SessionMachineInput::Cleared);
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn adopt_startup(&self, envelope: SessionEnvelope) -> SessionMachineInput {
        let mut core = self.inner.core.lock();
        if envelope.session.is_some() {
            core.session = envelope.session;
        }

        match envelope.user {
            Some(user) => {
                info!(user_id = %user.id, "Stored session confirmed");
                core.user = Some(user);
                SessionMachineInput::SessionConfirmed
            }
            None => {
                info!("Stored token accepted without identity");
                SessionMachineInput::TokenConfirmed
            }
        }
    }

    fn adopt_refresh(&self, envelope: SessionEnvelope) {
        let loaded = {
            let mut core = self.inner.core.lock();
            match envelope.user {
                Some(user) => {
                    debug!(user_id = %user.id, "User refreshed");
                    core.user = Some(user);
                    core.session = envelope.session;
                    core.token_only_email = None;
                    true
                }
                None => {
                    if envelope.session.is_some() {
                        core.session = envelope.session;
                    }
                    false
                }
            }
        };

        if loaded {
            self.advance(&SessionMachineInput::IdentityLoaded);
        } else {
            debug!("Refresh returned no user, keeping current state");
        }
    }

    /// Delete owned keys from storage and drop in-memory data.
    fn wipe(&self) {
        match self.inner.vault.clear_auth_keys() {
            Ok(removed) if !removed.is_empty() => {
                debug!(count = removed.len(), "Cleared persisted auth keys")
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Failed to clear persisted auth keys"),
        }
        self.inner.core.lock().reset();
    }

    fn transition(&self, input: &SessionMachineInput) -> AuthResult<AuthState> {
        let (from, to, public) = {
            let mut core = self.inner.core.lock();
            let from = core.machine.state().clone();
            core.machine.consume(input).map_err(|_| {
                AuthError::InvalidStateTransition(format!(
                    "cannot apply {:?} in state {:?}",
                    input, from
                ))
            })?;
            (from, core.machine.state().clone(), core.public_state())
        };

        debug!(from = ?from, to = ?to, input = ?input, "Session state transition");
        self.publish(public.clone());
        Ok(public)
    }

    fn advance(&self, input: &SessionMachineInput) {
        if let Err(e) = self.transition(input) {
            error!(error = %e, "Session state machine rejected input");
        }
    }

    fn publish(&self, state: AuthState) {
        self.inner.state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    fn schedule_startup_retry(&self) {
        let store: Weak<Inner> = Arc::downgrade(&self.inner);
        let delay = self.inner.startup_retry_delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = store.upgrade() else {
                return;
            };
            let store = SessionStore { inner };
            if store.is_closed() {
                return;
            }
            debug!("Retrying session validation after failed startup check");
            store.refresh_user().await;
        });

        *self.inner.startup_retry.lock() = Some(handle);
    }

    #[cfg(test)]
    pub(crate) fn machine_state(&self) -> crate::auth_fsm::SessionMachineState {
        self.inner.core.lock().machine.state().clone()
    }
}
