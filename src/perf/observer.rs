use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use super::timing::{PerformanceSnapshot, ResourceEntry, TimingSource};
use crate::kernel::cancel::TaskHandle;

/// Destination for timing metrics.
pub trait MetricsSink: Send + Sync {
    fn page_load(&self, snapshot: &PerformanceSnapshot);
    fn resource(&self, entry: &ResourceEntry);
}

/// Log-only metrics sink.
#[derive(Debug, Default)]
pub struct TracingMetricsSink;

impl MetricsSink for TracingMetricsSink {
    fn page_load(&self, s: &PerformanceSnapshot) {
        info!(
            dom_content_loaded_ms = s.dom_content_loaded_ms,
            load_complete_ms = s.load_complete_ms,
            total_load_ms = s.total_load_ms,
            "page load metrics"
        );
    }

    fn resource(&self, entry: &ResourceEntry) {
        info!("Resource Load: {} - {}ms", entry.name, entry.duration_ms);
    }
}

/// Navigation and resource timing capture. Fails open: a missing timing
/// facility means nothing is reported, never an error for the page.
pub struct PerformanceObserver {
    source: Arc<dyn TimingSource>,
    sink: Arc<dyn MetricsSink>,
    snapshot: OnceLock<PerformanceSnapshot>,
}

impl PerformanceObserver {
    pub fn new(source: Arc<dyn TimingSource>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            source,
            sink,
            snapshot: OnceLock::new(),
        }
    }

    /// Computes and reports the load snapshot. Reported at most once;
    /// later calls return the same snapshot.
    pub fn capture_page_load(&self) -> Option<PerformanceSnapshot> {
        if let Some(snap) = self.snapshot.get() {
            return Some(*snap);
        }

        let timing = match self.source.navigation() {
            Ok(t) => t,
            Err(e) => {
                debug!("skipping page load metrics: {}", e);
                return None;
            }
        };

        let snap = PerformanceSnapshot::from(&timing);
        if self.snapshot.set(snap).is_ok() {
            self.sink.page_load(&snap);
        }
        self.snapshot.get().copied()
    }

    pub fn snapshot(&self) -> Option<PerformanceSnapshot> {
        self.snapshot.get().copied()
    }

    /// Subscribes to resource timing for the rest of the page's life.
    /// `None` when the facility is missing or the stream was already taken.
    pub fn observe_resources(self: &Arc<Self>) -> Option<TaskHandle> {
        let mut entries = match self.source.resources() {
            Ok(rx) => rx,
            Err(e) => {
                debug!("resource observation disabled: {}", e);
                return None;
            }
        };

        let sink = Arc::clone(&self.sink);
        Some(TaskHandle::spawn("resource-timing", move |token| async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    next = entries.recv() => match next {
                        Some(entry) if entry.initiator_type.is_tracked() => sink.resource(&entry),
                        Some(_) => {}
                        None => break,
                    }
                }
            }
        }))
    }
}
