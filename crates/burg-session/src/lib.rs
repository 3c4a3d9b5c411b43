//! Authentication session lifecycle for the Burg client.
//!
//! This crate provides:
//! - [`SessionStore`]: owns the persisted access token and the in-memory
//!   user/session, and talks to the backend to establish, validate,
//!   refresh and tear down a session
//! - [`AuthApi`]: the HTTP client for the backend `/auth/*` endpoints
//! - An explicit FSM ([`session_machine`]) behind the observable [`AuthState`]

mod api;
mod auth_fsm;
mod error;
mod outcome;
mod store;
mod types;

pub use api::AuthApi;
pub use auth_fsm::session_machine;
pub use auth_fsm::{AuthState, SessionMachine, SessionMachineInput, SessionMachineState};
pub use error::{AuthError, AuthResult};
pub use outcome::{messages, LoginOutcome};
pub use store::SessionStore;
pub use types::{Credentials, LoginResponse, Session, SessionEnvelope, UserIdentity};
