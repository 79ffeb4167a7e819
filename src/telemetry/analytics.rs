use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::event::{
    ClickEvent, Event, PageContext, Payload, BUTTON_CLICK, PAGE_LOAD, PAGE_VIEW, RESOURCE_LOAD,
};
use super::metrics::TelemetrySummary;
use super::recorder::EventBuffer;
use crate::kernel::cancel::TaskHandle;
use crate::perf::observer::MetricsSink;
use crate::perf::timing::{PerformanceSnapshot, ResourceEntry};
use crate::session::SessionIdentity;

/// Session-scoped behavioral telemetry.
///
/// Every event is stamped at emission and tagged with the tab's session id.
/// Nothing leaves the process; the `tracing` line per event is the observability hook.
pub struct AnalyticsCollector {
    session: Arc<SessionIdentity>,
    buffer: Arc<EventBuffer>,
    trackable_class: String,
}

impl AnalyticsCollector {
    pub fn new(
        session: Arc<SessionIdentity>,
        buffer: Arc<EventBuffer>,
        trackable_class: impl Into<String>,
    ) -> Self {
        Self {
            session,
            buffer,
            trackable_class: trackable_class.into(),
        }
    }

    /// Emits the single `page_view` for this page load.
    pub fn init(&self, page: &PageContext) -> Event {
        self.track(PAGE_VIEW, page.payload())
    }

    pub fn track(&self, name: &str, payload: Payload) -> Event {
        let session_id = self.session.id();
        let event = self.buffer.append(name, payload, session_id);
        let data = serde_json::Value::Object(event.payload.clone());
        info!(
            event = %event.name,
            session = %event.session_id,
            data = %data,
            "analytics event"
        );
        event
    }

    /// Records a `button_click` when the click target carries the trackable class.
    pub fn handle_click(&self, click: &ClickEvent) -> Option<Event> {
        if !click.has_class(&self.trackable_class) {
            return None;
        }
        Some(self.track(BUTTON_CLICK, click.payload()))
    }

    /// Consumes the document click stream until it closes or the handle is stopped.
    pub fn attach_clicks(self: &Arc<Self>, mut clicks: mpsc::Receiver<ClickEvent>) -> TaskHandle {
        let collector = Arc::clone(self);
        TaskHandle::spawn("click-tracking", move |token| async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    next = clicks.recv() => match next {
                        Some(click) => {
                            collector.handle_click(&click);
                        }
                        None => {
                            debug!("click stream closed");
                            break;
                        }
                    }
                }
            }
        })
    }

    pub fn buffer(&self) -> &Arc<EventBuffer> {
        &self.buffer
    }

    pub fn events(&self) -> Vec<Event> {
        self.buffer.snapshot()
    }

    pub fn summary(&self) -> TelemetrySummary {
        self.buffer.summary()
    }
}

fn into_payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

/// Timing metrics share the event buffer when the collector is the metrics sink.
impl MetricsSink for AnalyticsCollector {
    fn page_load(&self, snapshot: &PerformanceSnapshot) {
        self.track(PAGE_LOAD, into_payload(json!(snapshot)));
    }

    fn resource(&self, entry: &ResourceEntry) {
        self.track(
            RESOURCE_LOAD,
            into_payload(json!({
                "name": entry.name,
                "durationMs": entry.duration_ms,
                "initiatorType": entry.initiator_type.as_str(),
            })),
        );
    }
}
