//! Navigation side of the Burg client.
//!
//! - [`RouteGuard`] keeps the current location consistent with the
//!   session's [`AuthState`](burg_session::AuthState)
//! - [`NavigationPort`] is the boundary to whatever actually moves the user,
//!   with in-app and full-reload strategies
//! - [`ScanLink`] turns scanned QR payloads into in-app routes

mod guard;
mod navigation;
mod scan_link;

pub use guard::{evaluate, Dispatch, GuardState, RouteGuard, RouteSet};
pub use navigation::{
    InAppNavigation, MemoryRouter, NavigationError, NavigationMode, NavigationPort,
    NavigationResult, PageLoader, ReloadNavigation, Router,
};
pub use scan_link::{
    ScanDebouncer, ScanDecision, ScanLink, ScanLinkError, ScanLinkResult, ScanTarget,
};
