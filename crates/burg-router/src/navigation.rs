//! Navigation capability and its strategies.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use url::Url;

/// How a navigation affects history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// Swap the current entry.
    Replace,
    /// Add a new entry.
    Push,
}

/// Navigation error type.
#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Navigation rejected: {0}")]
    Rejected(String),

    #[error("Invalid navigation target: {0}")]
    InvalidTarget(String),

    #[error("Page load failed for {url}: {reason}")]
    Load { url: String, reason: String },
}

pub type NavigationResult<T> = Result<T, NavigationError>;

/// The boundary the route guard dispatches through.
pub trait NavigationPort: Send + Sync {
    fn navigate_to(&self, path: &str, mode: NavigationMode) -> NavigationResult<()>;
}

impl<N: NavigationPort + ?Sized> NavigationPort for Arc<N> {
    fn navigate_to(&self, path: &str, mode: NavigationMode) -> NavigationResult<()> {
        (**self).navigate_to(path, mode)
    }
}

// ============================================================================
// In-app navigation
// ============================================================================

/// Client-side router with history semantics.
pub trait Router: Send + Sync {
    fn replace(&self, path: &str) -> NavigationResult<()>;
    fn push(&self, path: &str) -> NavigationResult<()>;
}

impl<R: Router + ?Sized> Router for Arc<R> {
    fn replace(&self, path: &str) -> NavigationResult<()> {
        (**self).replace(path)
    }

    fn push(&self, path: &str) -> NavigationResult<()> {
        (**self).push(path)
    }
}

/// Navigates by asking a [`Router`] to replace or push.
pub struct InAppNavigation<R: Router> {
    router: R,
}

impl<R: Router> InAppNavigation<R> {
    pub fn new(router: R) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &R {
        &self.router
    }
}

impl<R: Router> NavigationPort for InAppNavigation<R> {
    fn navigate_to(&self, path: &str, mode: NavigationMode) -> NavigationResult<()> {
        match mode {
            NavigationMode::Replace => self.router.replace(path),
            NavigationMode::Push => self.router.push(path),
        }
    }
}

/// In-process router keeping a history stack.
///
/// The current location is also published on a watch channel so a
/// [`RouteGuard`](crate::RouteGuard) driver loop can follow it.
pub struct MemoryRouter {
    history: Mutex<Vec<String>>,
    location_tx: watch::Sender<String>,
}

impl MemoryRouter {
    pub fn new(initial_path: impl Into<String>) -> Self {
        let initial_path = initial_path.into();
        let (location_tx, _) = watch::channel(initial_path.clone());
        Self {
            history: Mutex::new(vec![initial_path]),
            location_tx,
        }
    }

    /// Current location.
    pub fn current(&self) -> String {
        self.location_tx.borrow().clone()
    }

    /// All entries, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    /// Follow location changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.location_tx.subscribe()
    }

    /// Pop the newest entry. The first entry is never removed.
    pub fn back(&self) -> Option<String> {
        let mut history = self.history.lock();
        if history.len() < 2 {
            return None;
        }
        history.pop();
        let current = history.last().cloned()?;
        self.location_tx.send_replace(current.clone());
        Some(current)
    }

    fn check_path(path: &str) -> NavigationResult<()> {
        if path.starts_with('/') {
            Ok(())
        } else {
            Err(NavigationError::InvalidTarget(path.to_string()))
        }
    }
}

impl Router for MemoryRouter {
    fn replace(&self, path: &str) -> NavigationResult<()> {
        Self::check_path(path)?;
        let mut history = self.history.lock();
        match history.last_mut() {
            Some(last) => *last = path.to_string(),
            None => history.push(path.to_string()),
        }
        self.location_tx.send_replace(path.to_string());
        Ok(())
    }

    fn push(&self, path: &str) -> NavigationResult<()> {
        Self::check_path(path)?;
        self.history.lock().push(path.to_string());
        self.location_tx.send_replace(path.to_string());
        Ok(())
    }
}

// ============================================================================
// Full page load
// ============================================================================

/// Loads an absolute URL as a fresh page.
pub trait PageLoader: Send + Sync {
    fn load(&self, url: &Url) -> NavigationResult<()>;
}

/// Navigates by loading `base_url + path`, discarding in-app history.
///
/// The mode is irrelevant for a full load and only logged.
pub struct ReloadNavigation<L: PageLoader> {
    base_url: Url,
    loader: L,
}

impl<L: PageLoader> ReloadNavigation<L> {
    pub fn new(base_url: Url, loader: L) -> Self {
        Self { base_url, loader }
    }

    /// Absolute URL for an app path.
    pub fn url_for(&self, path: &str) -> NavigationResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| NavigationError::InvalidTarget(format!("{}: {}", path, e)))
    }
}

impl<L: PageLoader> NavigationPort for ReloadNavigation<L> {
    fn navigate_to(&self, path: &str, mode: NavigationMode) -> NavigationResult<()> {
        let url = self.url_for(path)?;
        tracing::debug!(url = %url, mode = ?mode, "Loading page");
        self.loader.load(&url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingLoader {
        loaded: Mutex<Vec<String>>,
    }

    impl PageLoader for RecordingLoader {
        fn load(&self, url: &Url) -> NavigationResult<()> {
            self.loaded.lock().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_memory_router_replace_and_push() {
        let router = MemoryRouter::new("/checklist");

        router.replace("/login").unwrap();
        assert_eq!(router.history(), vec!["/login".to_string()]);

        router.push("/").unwrap();
        assert_eq!(router.current(), "/");
        assert_eq!(router.history(), vec!["/login".to_string(), "/".to_string()]);

        assert_eq!(router.back(), Some("/login".to_string()));
        assert_eq!(router.back(), None);
    }

    #[test]
    fn test_memory_router_rejects_relative_paths() {
        let router = MemoryRouter::new("/");
        assert!(matches!(
            router.push("login"),
            Err(NavigationError::InvalidTarget(_))
        ));
        assert_eq!(router.current(), "/");
    }

    #[test]
    fn test_memory_router_publishes_location() {
        let router = MemoryRouter::new("/");
        let mut rx = router.subscribe();

        router.replace("/profile").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "/profile");
    }

    #[test]
    fn test_in_app_navigation_maps_modes() {
        let router = Arc::new(MemoryRouter::new("/gpt"));
        let navigation = InAppNavigation::new(router.clone());

        navigation
            .navigate_to("/login", NavigationMode::Replace)
            .unwrap();
        navigation.navigate_to("/", NavigationMode::Push).unwrap();

        assert_eq!(router.history(), vec!["/login".to_string(), "/".to_string()]);
    }

    #[test]
    fn test_reload_navigation_joins_base_url() {
        let base = Url::parse("https://app.burg-dashboard.nl/").unwrap();
        let navigation = ReloadNavigation::new(base, RecordingLoader::default());

        navigation
            .navigate_to("/login", NavigationMode::Replace)
            .unwrap();

        assert_eq!(
            *navigation.loader.loaded.lock(),
            vec!["https://app.burg-dashboard.nl/login".to_string()]
        );
    }
}
