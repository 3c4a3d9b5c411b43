//! Scanned QR payloads.
//!
//! Codes printed by the dashboard encode
//! `https://<scan host>/scan/redirect/{type}/{id}` and open the detail
//! screen at `/scan/{type}/{id}`. Everything else is shown as plain text.

use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Pause after a code that does not lead into the app.
pub const EXTERNAL_RESET_DELAY: Duration = Duration::from_secs(2);

/// Pause after a code that could not be processed.
pub const ERROR_RESET_DELAY: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum ScanLinkError {
    #[error("Scanned URL could not be parsed: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type ScanLinkResult<T> = Result<T, ScanLinkError>;

/// An in-app detail link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanLink {
    pub entity_type: String,
    pub entity_id: String,
}

/// Where a scanned payload leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanTarget {
    App { link: ScanLink, route: String },
    External { text: String },
}

impl ScanLink {
    /// Classify scanned text.
    ///
    /// Text starting with `http` must parse as a URL. It maps into the app
    /// when the scheme is http(s), the host equals `scan_host`, and the
    /// path contains `/scan/redirect/{type}/{id}` with both parts present.
    pub fn parse(data: &str, scan_host: &str) -> ScanLinkResult<ScanTarget> {
        let text = data.trim();
        let external = || ScanTarget::External {
            text: data.to_string(),
        };

        if !text.starts_with("http") {
            return Ok(external());
        }

        let url = Url::parse(text)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Ok(external());
        }
        if !url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(scan_host))
        {
            return Ok(external());
        }

        match Self::from_path(url.path()) {
            Some(link) => {
                let route = link.route();
                Ok(ScanTarget::App { link, route })
            }
            None => Ok(external()),
        }
    }

    fn from_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').collect();
        let start = segments
            .windows(2)
            .position(|pair| pair == ["scan", "redirect"])?;

        let entity_type = segments.get(start + 2).filter(|s| !s.is_empty())?;
        let entity_id = segments.get(start + 3).filter(|s| !s.is_empty())?;

        Some(Self {
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
        })
    }

    /// In-app route of the detail screen.
    pub fn route(&self) -> String {
        format!("/scan/{}/{}", self.entity_type, self.entity_id)
    }
}

/// Outcome of offering a payload to the [`ScanDebouncer`].
#[derive(Debug)]
pub enum ScanDecision {
    /// Scanner is paused or the payload repeats the last one.
    Ignored,
    /// Payload was classified.
    Accepted(ScanTarget),
    /// Payload looked like a URL but could not be parsed.
    Failed(ScanLinkError),
}

/// Suppresses duplicate and rapid-fire scans.
///
/// After a scan the scanner pauses: 2 s after an external code, 1 s after
/// an error, and until [`reset`](Self::reset) after an in-app link (the
/// scanner closes and navigates away).
#[derive(Debug)]
pub struct ScanDebouncer {
    scan_host: String,
    last_payload: Option<String>,
    paused: Pause,
}

#[derive(Debug, Clone, Copy)]
enum Pause {
    None,
    Until(Instant),
    UntilReset,
}

impl ScanDebouncer {
    pub fn new(scan_host: impl Into<String>) -> Self {
        Self {
            scan_host: scan_host.into(),
            last_payload: None,
            paused: Pause::None,
        }
    }

    /// Re-arm the scanner, e.g. when it is shown again.
    pub fn reset(&mut self) {
        self.last_payload = None;
        self.paused = Pause::None;
    }

    pub fn offer(&mut self, data: &str, now: Instant) -> ScanDecision {
        match self.paused {
            Pause::UntilReset => return ScanDecision::Ignored,
            Pause::Until(deadline) if now < deadline => return ScanDecision::Ignored,
            Pause::Until(_) => self.reset(),
            Pause::None => {}
        }

        if self.last_payload.as_deref() == Some(data) {
            return ScanDecision::Ignored;
        }
        self.last_payload = Some(data.to_string());

        match ScanLink::parse(data, &self.scan_host) {
            Ok(target @ ScanTarget::App { .. }) => {
                tracing::debug!("Scanned in-app link");
                self.paused = Pause::UntilReset;
                ScanDecision::Accepted(target)
            }
            Ok(target) => {
                tracing::debug!("Scanned external code");
                self.paused = Pause::Until(now + EXTERNAL_RESET_DELAY);
                ScanDecision::Accepted(target)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to process scanned code");
                self.paused = Pause::Until(now + ERROR_RESET_DELAY);
                ScanDecision::Failed(e)
            }
        }
    }
}
