//! Behavioral telemetry: events, the append-only buffer, and the collector.
//!
//! Events carry a session id and interaction data only. Nothing is transmitted;
//! exporting the buffer is left to whoever owns the page.

pub mod analytics;
pub mod event;
pub mod metrics;
pub mod recorder;

pub use analytics::AnalyticsCollector;
pub use event::{ClickEvent, Event, PageContext, Payload};
pub use metrics::{compute_summary, TelemetrySummary};
pub use recorder::EventBuffer;
