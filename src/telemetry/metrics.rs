use serde::Serialize;
use std::collections::BTreeMap;

use super::event::{Event, BUTTON_CLICK, PAGE_VIEW};
use crate::kernel::time::Timestamp;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySummary {
    pub total_events: u64,
    pub page_views: u64,
    pub button_clicks: u64,
    pub by_name: BTreeMap<String, u64>,
    pub first_event_at: Option<Timestamp>,
    pub last_event_at: Option<Timestamp>,
}

pub fn compute_summary(events: &[Event]) -> TelemetrySummary {
    let mut summary = TelemetrySummary::default();

    for event in events {
        summary.total_events += 1;
        *summary.by_name.entry(event.name.clone()).or_insert(0) += 1;

        match event.name.as_str() {
            PAGE_VIEW => summary.page_views += 1,
            BUTTON_CLICK => summary.button_clicks += 1,
            _ => {}
        }
    }

    summary.first_event_at = events.first().map(|e| e.timestamp);
    summary.last_event_at = events.last().map(|e| e.timestamp);
    summary
}
