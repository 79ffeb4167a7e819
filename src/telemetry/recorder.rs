use std::sync::Mutex;

use super::event::{Event, Payload};
use super::metrics::{compute_summary, TelemetrySummary};
use crate::error::Result;
use crate::kernel::time;
use crate::session::SessionId;

/// Append-only, order-preserving event log.
///
/// Appends are serialized by one lock and stamped inside it, so buffer order is
/// also timestamp order. There is no cap and reads never drain.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Mutex<Vec<Event>>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, name: &str, payload: Payload, session_id: SessionId) -> Event {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        let mut timestamp = time::now();
        // The wall clock can step backwards; never let the log go out of order.
        if let Some(last) = events.last() {
            if timestamp < last.timestamp {
                timestamp = last.timestamp;
            }
        }
        let event = Event {
            name: name.to_string(),
            payload,
            timestamp,
            session_id,
        };
        events.push(event.clone());
        event
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> TelemetrySummary {
        let events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        compute_summary(&events)
    }

    /// JSON array of every event so far, for handing to an external sink.
    pub fn export_json(&self) -> Result<String> {
        let events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        Ok(serde_json::to_string(&*events)?)
    }
}
