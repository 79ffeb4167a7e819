use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::error::WatchError;
use crate::kernel::cancel::TaskHandle;
use crate::kernel::probe::HttpProbe;
use crate::kernel::render::RenderSink;
use crate::monitor::types::{StatusReport, StatusState};

/// Periodic health poller driving the three-state status card.
///
/// Every poll overwrites the state with the classification of its own outcome;
/// there is no memory of earlier polls and no retry inside a poll.
pub struct StatusMonitor {
    probe: Arc<dyn HttpProbe>,
    sink: Arc<dyn RenderSink>,
    health_url: String,
    timeout: Duration,
    current: Mutex<Option<StatusReport>>,
}

impl StatusMonitor {
    pub fn new(
        probe: Arc<dyn HttpProbe>,
        sink: Arc<dyn RenderSink>,
        health_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            probe,
            sink,
            health_url: health_url.into(),
            timeout,
            current: Mutex::new(None),
        }
    }

    /// Last rendered state. `None` until the first poll completes.
    pub fn current(&self) -> Option<StatusReport> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// One health check: probe, classify, store, render.
    pub async fn poll(&self) -> StatusReport {
        // The probe may enforce its own timeout; this one is the hard bound.
        let outcome = match tokio::time::timeout(
            self.timeout,
            self.probe.health(&self.health_url, self.timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(WatchError::timeout(self.timeout)),
        };

        match &outcome {
            Ok(code) => info!(url = %self.health_url, status = code, "health poll completed"),
            Err(e) => warn!(url = %self.health_url, "health poll failed: {}", e),
        }

        let report = StatusState::classify(&outcome).report();
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(report.clone());
        self.sink.render_status(&report);
        report
    }

    /// Polls immediately, then once per `every`, until the handle is stopped or dropped.
    /// Missed ticks are skipped rather than bunched up.
    pub fn spawn(self: &Arc<Self>, every: Duration) -> TaskHandle {
        let monitor = Arc::clone(self);
        TaskHandle::spawn("status-monitor", move |token| async move {
            info!(interval_ms = every.as_millis() as u64, "status polling started");
            let mut cadence = interval(every);
            cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = cadence.tick() => {
                        monitor.poll().await;
                    }
                }
            }
            info!("status polling stopped");
        })
    }
}
