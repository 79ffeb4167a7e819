use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{Result, WatchError};
use crate::kernel::probe::{HttpProbe, ProbeResponse};
use crate::kernel::render::RenderSink;
use crate::redirect::types::{
    Notification, RedirectCheckResult, RedirectOutcome, DOMAIN_MISMATCH_DETAIL,
};

/// Accepts only a 301/302 whose `Location` contains the expected target.
fn expect_redirect(response: ProbeResponse, expected_target: &str) -> Result<String> {
    match (response.status, response.location) {
        (301 | 302, Some(location)) if location.contains(expected_target) => Ok(location),
        (status @ (301 | 302), _) => Err(WatchError::ProtocolMismatch {
            status,
            detail: DOMAIN_MISMATCH_DETAIL.to_string(),
        }),
        (status, _) => Err(WatchError::ProtocolMismatch {
            status,
            detail: "not a redirect".to_string(),
        }),
    }
}

/// Pure classification of a probe outcome, applied in rule order.
pub fn classify(outcome: Result<ProbeResponse>, expected_target: &str) -> RedirectCheckResult {
    match outcome.and_then(|response| expect_redirect(response, expected_target)) {
        Ok(location) => RedirectCheckResult::new(RedirectOutcome::Success, location),
        Err(WatchError::ProtocolMismatch { status: 301 | 302, detail }) => {
            RedirectCheckResult::new(RedirectOutcome::DomainMismatch, detail)
        }
        Err(WatchError::ProtocolMismatch { status, .. }) => {
            RedirectCheckResult::new(RedirectOutcome::UnexpectedStatus, status.to_string())
        }
        Err(WatchError::NetworkFailure(msg)) => {
            RedirectCheckResult::new(RedirectOutcome::NetworkFailure, msg)
        }
        Err(other) => RedirectCheckResult::new(RedirectOutcome::NetworkFailure, other.to_string()),
    }
}

/// Shows the loading indicator while at least one guard is alive.
///
/// The count and the sink call change together under one lock, so the
/// rendered indicator always matches the count.
struct LoadingGuard {
    in_flight: Arc<Mutex<usize>>,
    sink: Arc<dyn RenderSink>,
}

impl LoadingGuard {
    fn acquire(in_flight: &Arc<Mutex<usize>>, sink: &Arc<dyn RenderSink>) -> Self {
        let mut count = in_flight.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
        if *count == 1 {
            sink.set_loading(true);
        }
        drop(count);
        Self {
            in_flight: Arc::clone(in_flight),
            sink: Arc::clone(sink),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut count = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.sink.set_loading(false);
        }
    }
}

/// One-shot redirect checker with a transient result notification.
pub struct RedirectVerifier {
    probe: Arc<dyn HttpProbe>,
    sink: Arc<dyn RenderSink>,
    timeout: Duration,
    notification_ttl: Duration,
    in_flight: Arc<Mutex<usize>>,
}

impl RedirectVerifier {
    pub fn new(
        probe: Arc<dyn HttpProbe>,
        sink: Arc<dyn RenderSink>,
        timeout: Duration,
        notification_ttl: Duration,
    ) -> Self {
        Self {
            probe,
            sink,
            timeout,
            notification_ttl,
            in_flight: Arc::new(Mutex::new(0)),
        }
    }

    pub async fn test_redirect(&self, source_url: &str, expected_target: &str) -> RedirectCheckResult {
        let result = {
            let _loading = LoadingGuard::acquire(&self.in_flight, &self.sink);
            info!(url = %source_url, expected = %expected_target, "redirect probe started");
            let outcome = match tokio::time::timeout(
                self.timeout,
                self.probe.head_no_redirect(source_url, self.timeout),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(WatchError::timeout(self.timeout)),
            };
            classify(outcome, expected_target)
        };

        match result.outcome {
            RedirectOutcome::Success => info!(location = %result.detail, "redirect verified"),
            _ => warn!(outcome = ?result.outcome, detail = %result.detail, "redirect check did not pass"),
        }

        self.notify(&result);
        result
    }

    /// Posts the notification and schedules its own removal.
    /// Each notification owns its timer; a later test never touches it.
    fn notify(&self, result: &RedirectCheckResult) {
        let notification = Notification::for_result(result);
        self.sink.show_notification(&notification);

        let sink = Arc::clone(&self.sink);
        let ttl = self.notification_ttl;
        let id = notification.id;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            sink.dismiss_notification(id);
        });
    }

    /// Flashes the loading indicator for `duration`.
    pub fn show_loading(&self, duration: Duration) {
        let guard = LoadingGuard::acquire(&self.in_flight, &self.sink);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            drop(guard);
        });
    }
}
