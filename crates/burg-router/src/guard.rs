//! Route guard: keeps the location consistent with the auth state.
//!
//! Evaluation is pure ([`evaluate`]). Acting on it is split in two phases:
//! [`RouteGuard::observe`] records what should happen and
//! [`RouteGuard::commit`] performs it, so hosts with a render cycle can
//! observe during render and commit afterwards.

use crate::navigation::{NavigationMode, NavigationPort};
use burg_config::Config;
use burg_session::AuthState;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// The public route and where signed-in users land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSet {
    pub public_path: String,
    pub default_private_path: String,
}

impl RouteSet {
    pub fn new(public_path: impl Into<String>, default_private_path: impl Into<String>) -> Self {
        Self {
            public_path: public_path.into(),
            default_private_path: default_private_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.public_path, &config.default_private_path)
    }

    /// True if `path` is the public route.
    ///
    /// Query string, fragment and trailing slashes are ignored, so
    /// `/login/?next=/` is public. Sub-paths such as `/login/reset` are not.
    pub fn is_public(&self, path: &str) -> bool {
        normalize(path) == normalize(&self.public_path)
    }
}

impl Default for RouteSet {
    fn default() -> Self {
        Self::new(
            burg_config::DEFAULT_PUBLIC_PATH,
            burg_config::DEFAULT_DEFAULT_PRIVATE_PATH,
        )
    }
}

fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Verdict for one `(auth state, path)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardState {
    /// Startup check still running. Show a placeholder, do not navigate.
    AwaitingAuth,
    /// Signed out on a private route.
    ForcedToPublic,
    /// Signed in on the public route.
    ForcedToPrivate,
    /// Nothing to do.
    Stable,
}

impl GuardState {
    /// Where this verdict sends the user, if anywhere.
    pub fn target<'a>(&self, routes: &'a RouteSet) -> Option<&'a str> {
        match self {
            GuardState::ForcedToPublic => Some(&routes.public_path),
            GuardState::ForcedToPrivate => Some(&routes.default_private_path),
            GuardState::AwaitingAuth | GuardState::Stable => None,
        }
    }
}

/// Decide what the guard should do for `state` at `path`.
pub fn evaluate(state: &AuthState, path: &str, routes: &RouteSet) -> GuardState {
    if state.is_loading() {
        return GuardState::AwaitingAuth;
    }

    let on_public = routes.is_public(path);
    match (state.is_signed_in(), on_public) {
        (false, false) => GuardState::ForcedToPublic,
        (true, true) => GuardState::ForcedToPrivate,
        _ => GuardState::Stable,
    }
}

/// What [`RouteGuard::commit`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Dispatch {
    /// No redirect was pending.
    Idle,
    /// Same target dispatched within the cooldown.
    Suppressed { target: String },
    /// Navigation succeeded.
    Navigated { target: String, mode: NavigationMode },
    /// Both attempts failed.
    Abandoned { target: String },
}

/// Redirects navigation based on the auth state and current location.
pub struct RouteGuard<N: NavigationPort> {
    navigator: N,
    routes: RouteSet,
    redirect_cooldown: Duration,
    navigation_retry_delay: Duration,
    pending: Option<String>,
    last_dispatch: Option<(String, Instant)>,
}

impl<N: NavigationPort> RouteGuard<N> {
    pub fn new(
        navigator: N,
        routes: RouteSet,
        redirect_cooldown: Duration,
        navigation_retry_delay: Duration,
    ) -> Self {
        Self {
            navigator,
            routes,
            redirect_cooldown,
            navigation_retry_delay,
            pending: None,
            last_dispatch: None,
        }
    }

    pub fn from_config(navigator: N, config: &Config) -> Self {
        Self::new(
            navigator,
            RouteSet::from_config(config),
            config.redirect_cooldown(),
            config.navigation_retry_delay(),
        )
    }

    pub fn routes(&self) -> &RouteSet {
        &self.routes
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Redirect recorded by the last [`observe`](Self::observe), if any.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Evaluate and record the redirect to perform on the next commit.
    ///
    /// A later observation replaces an earlier uncommitted one.
    pub fn observe(&mut self, state: &AuthState, path: &str) -> GuardState {
        let verdict = evaluate(state, path, &self.routes);
        self.pending = verdict.target(&self.routes).map(str::to_string);

        if let Some(target) = &self.pending {
            debug!(path = %path, target = %target, verdict = ?verdict, "Redirect pending");
        }

        verdict
    }

    /// When the cooldown for the last dispatched target ends.
    pub fn cooldown_until(&self) -> Option<Instant> {
        self.last_dispatch
            .as_ref()
            .map(|(_, at)| *at + self.redirect_cooldown)
    }

    /// Dispatch the pending redirect.
    ///
    /// Uses replace semantics. If that fails, retries once with push after
    /// the retry delay. A second failure is logged and dropped.
    ///
    /// A redirect suppressed by the cooldown stays pending, so a commit
    /// after [`cooldown_until`](Self::cooldown_until) dispatches it.
    pub async fn commit(&mut self) -> Dispatch {
        let Some(target) = self.pending.take() else {
            return Dispatch::Idle;
        };

        let now = Instant::now();
        if let Some((last, at)) = &self.last_dispatch {
            if *last == target && now.duration_since(*at) < self.redirect_cooldown {
                debug!(target = %target, "Redirect suppressed during cooldown");
                self.pending = Some(target.clone());
                return Dispatch::Suppressed { target };
            }
        }
        self.last_dispatch = Some((target.clone(), now));

        match self.navigator.navigate_to(&target, NavigationMode::Replace) {
            Ok(()) => {
                info!(target = %target, "Redirected");
                return Dispatch::Navigated {
                    target,
                    mode: NavigationMode::Replace,
                };
            }
            Err(e) => warn!(target = %target, error = %e, "Redirect failed, retrying"),
        }

        tokio::time::sleep(self.navigation_retry_delay).await;

        match self.navigator.navigate_to(&target, NavigationMode::Push) {
            Ok(()) => {
                info!(target = %target, "Redirected on retry");
                Dispatch::Navigated {
                    target,
                    mode: NavigationMode::Push,
                }
            }
            Err(e) => {
                error!(target = %target, error = %e, "Redirect retry failed, giving up");
                Dispatch::Abandoned { target }
            }
        }
    }

    /// Drive the guard from two channels until either sender is dropped.
    ///
    /// Every change of the auth state or the location is observed and
    /// committed immediately. A redirect held back by the cooldown is
    /// re-evaluated once the cooldown ends.
    pub async fn run(
        mut self,
        mut auth_rx: watch::Receiver<AuthState>,
        mut location_rx: watch::Receiver<String>,
    ) {
        loop {
            let state = auth_rx.borrow_and_update().clone();
            let path = location_rx.borrow_and_update().clone();

            self.observe(&state, &path);
            let recheck_at = match self.commit().await {
                Dispatch::Suppressed { .. } => self.cooldown_until(),
                _ => None,
            };

            let recheck = tokio::time::sleep_until(recheck_at.unwrap_or_else(Instant::now));

            tokio::select! {
                _ = recheck, if recheck_at.is_some() => {
                    debug!("Cooldown ended, re-evaluating route");
                }
                changed = auth_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = location_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        debug!("Route guard stopped");
    }
}
