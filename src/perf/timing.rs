use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::error::{Result, WatchError};

/// Navigation timing marks in milliseconds since navigation start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationTiming {
    pub fetch_start: f64,
    pub dom_content_loaded_event_start: f64,
    pub dom_content_loaded_event_end: f64,
    pub load_event_start: f64,
    pub load_event_end: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub dom_content_loaded_ms: f64,
    pub load_complete_ms: f64,
    pub total_load_ms: f64,
}

impl From<&NavigationTiming> for PerformanceSnapshot {
    fn from(t: &NavigationTiming) -> Self {
        Self {
            dom_content_loaded_ms: t.dom_content_loaded_event_end - t.dom_content_loaded_event_start,
            load_complete_ms: t.load_event_end - t.load_event_start,
            total_load_ms: t.load_event_end - t.fetch_start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InitiatorType {
    Image,
    Stylesheet,
    Script,
    Other(String),
}

impl InitiatorType {
    /// Accepts both the browser spellings (`img`, `css`) and the long names.
    /// `link` stays untracked: it also covers preloads and icons.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "img" | "image" => InitiatorType::Image,
            "css" | "stylesheet" => InitiatorType::Stylesheet,
            "script" => InitiatorType::Script,
            other => InitiatorType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InitiatorType::Image => "image",
            InitiatorType::Stylesheet => "stylesheet",
            InitiatorType::Script => "script",
            InitiatorType::Other(s) => s,
        }
    }

    pub fn is_tracked(&self) -> bool {
        !matches!(self, InitiatorType::Other(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    pub name: String,
    pub duration_ms: f64,
    pub initiator_type: InitiatorType,
}

impl ResourceEntry {
    pub fn new(name: impl Into<String>, duration_ms: f64, initiator: &str) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            initiator_type: InitiatorType::parse(initiator),
        }
    }
}

/// The host's timing facility. Either half may be missing.
pub trait TimingSource: Send + Sync {
    fn navigation(&self) -> Result<NavigationTiming>;

    /// Hands out the resource stream. It can be taken once per page load.
    fn resources(&self) -> Result<mpsc::UnboundedReceiver<ResourceEntry>>;
}

/// Timing source fed by the host: navigation marks are set when known and
/// resource entries are pushed through a sender.
pub struct ManualTimingSource {
    navigation: Mutex<Option<NavigationTiming>>,
    feed: Option<mpsc::UnboundedSender<ResourceEntry>>,
    stream: Mutex<Option<mpsc::UnboundedReceiver<ResourceEntry>>>,
}

impl ManualTimingSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            navigation: Mutex::new(None),
            feed: Some(tx),
            stream: Mutex::new(Some(rx)),
        }
    }

    /// A source with no timing facility at all.
    pub fn unavailable() -> Self {
        Self {
            navigation: Mutex::new(None),
            feed: None,
            stream: Mutex::new(None),
        }
    }

    pub fn set_navigation(&self, timing: NavigationTiming) {
        *self.navigation.lock().unwrap_or_else(|e| e.into_inner()) = Some(timing);
    }

    pub fn resource_feed(&self) -> Option<mpsc::UnboundedSender<ResourceEntry>> {
        self.feed.clone()
    }
}

impl Default for ManualTimingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingSource for ManualTimingSource {
    fn navigation(&self) -> Result<NavigationTiming> {
        self.navigation
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .ok_or(WatchError::ResourceUnavailable("navigation timing"))
    }

    fn resources(&self) -> Result<mpsc::UnboundedReceiver<ResourceEntry>> {
        self.stream
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(WatchError::ResourceUnavailable("resource timing"))
    }
}
