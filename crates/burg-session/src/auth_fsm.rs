//! Session state machine using rust-fsm.
//!
//! Every change to the authentication status goes through this machine, so
//! illegal orderings (a second startup check, a login result arriving after
//! logout began) are rejected instead of silently applied.
//!
//! ## State Diagram
//!
//! ```text
//!  ┌─────────────────┐  Initialize   ┌─────────────────┐
//!  │  Uninitialized  │ ────────────► │  Initializing   │
//!  └────────┬────────┘               └────────┬────────┘
//!           │                                 │ SessionConfirmed ──► SignedIn
//!           │                                 │ TokenConfirmed ────► TokenOnly
//!           │                                 │ NoToken / SessionRejected / CheckFailed
//!           │                                 ▼
//!           │                        ┌─────────────────┐
//!           └──────────────────────► │    SignedOut    │ ◄──────────┐
//!         Cleared / TokenRejected    └────────┬────────┘            │
//!                                             │ LoginAttempt        │ LoginFailed
//!                                             ▼                     │
//!                                    ┌─────────────────┐            │
//!                                    │    LoggingIn    │ ───────────┘
//!                                    └────────┬────────┘
//!                          LoginSucceeded     │     LoginTokenOnly
//!                        ┌────────────────────┴────────────────┐
//!                        ▼                                     ▼
//!               ┌─────────────────┐  IdentityLoaded   ┌─────────────────┐
//!               │    SignedIn     │ ◄──────────────── │    TokenOnly    │
//!               └────────┬────────┘                   └────────┬────────┘
//!                        │ LogoutRequested                     │
//!                        ▼                                     │
//!               ┌─────────────────┐  LogoutComplete            │
//!               │   LoggingOut    │ ─────────► SignedOut ◄─────┘ TokenRejected / Cleared
//!               └─────────────────┘
//! ```

use crate::types::UserIdentity;
use rust_fsm::*;
use serde::Serialize;

// Generates a module `session_machine` with State, Input and StateMachine.
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(Uninitialized)

    Uninitialized => {
        Initialize => Initializing,
        LoginAttempt => LoggingIn,
        LogoutRequested => LoggingOut,
        IdentityLoaded => SignedIn,
        TokenRejected => SignedOut,
        Cleared => SignedOut
    },
    Initializing => {
        SessionConfirmed => SignedIn,
        TokenConfirmed => TokenOnly,
        NoToken => SignedOut,
        SessionRejected => SignedOut,
        CheckFailed => SignedOut
    },
    SignedOut => {
        LoginAttempt => LoggingIn,
        LogoutRequested => LoggingOut,
        IdentityLoaded => SignedIn,
        TokenRejected => SignedOut,
        Cleared => SignedOut
    },
    LoggingIn => {
        LoginSucceeded => SignedIn,
        LoginTokenOnly => TokenOnly,
        LoginFailed => SignedOut
    },
    SignedIn => {
        LoginAttempt => LoggingIn,
        LogoutRequested => LoggingOut,
        IdentityLoaded => SignedIn,
        TokenRejected => SignedOut,
        Cleared => SignedOut
    },
    TokenOnly => {
        LoginAttempt => LoggingIn,
        LogoutRequested => LoggingOut,
        IdentityLoaded => SignedIn,
        TokenRejected => SignedOut,
        Cleared => SignedOut
    },
    LoggingOut => {
        LogoutComplete => SignedOut
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Observable authentication state.
///
/// This is what the route guard and the UI consume. It is derived from the
/// machine state plus the identity currently held in memory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthState {
    /// The startup check has not begun.
    Uninitialized,
    /// The startup check is in flight.
    Loading,
    /// Signed in with a known user identity.
    Authenticated { user: UserIdentity, is_admin: bool },
    /// A valid token is held but the backend has not returned an identity
    /// yet. Counts as signed in for routing.
    TokenOnly { email: Option<String> },
    /// No session.
    Unauthenticated,
}

impl AuthState {
    /// True until the startup check has produced a verdict.
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Uninitialized | AuthState::Loading)
    }

    /// True when a session token is held, with or without an identity.
    pub fn is_signed_in(&self) -> bool {
        matches!(
            self,
            AuthState::Authenticated { .. } | AuthState::TokenOnly { .. }
        )
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            AuthState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AuthState::Authenticated { is_admin: true, .. })
    }

    /// Project a machine state and the in-memory identity onto the public view.
    pub(crate) fn resolve(
        state: &SessionMachineState,
        user: Option<&UserIdentity>,
        token_only_email: Option<&str>,
    ) -> Self {
        match state {
            SessionMachineState::Uninitialized => AuthState::Uninitialized,
            SessionMachineState::Initializing => AuthState::Loading,
            SessionMachineState::SignedIn | SessionMachineState::TokenOnly => match user {
                Some(user) => AuthState::Authenticated {
                    is_admin: user.is_admin(),
                    user: user.clone(),
                },
                None => AuthState::TokenOnly {
                    email: token_only_email.map(str::to_string),
                },
            },
            SessionMachineState::SignedOut
            | SessionMachineState::LoggingIn
            | SessionMachineState::LoggingOut => AuthState::Unauthenticated,
        }
    }
}
