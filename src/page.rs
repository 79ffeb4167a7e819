use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::WatchConfig;
use crate::error::Result;
use crate::kernel::cancel::TaskHandle;
use crate::kernel::probe::HttpProbe;
use crate::kernel::render::RenderSink;
use crate::monitor::{StatusMonitor, StatusReport};
use crate::perf::{MetricsSink, PerformanceObserver, PerformanceSnapshot, TimingSource};
use crate::redirect::{RedirectCheckResult, RedirectVerifier};
use crate::session::{FileSessionStore, MemorySessionStore, SessionIdentity, SessionStore};
use crate::telemetry::{AnalyticsCollector, ClickEvent, Event, PageContext, Payload};

/// Collaborators supplied by whoever hosts the page.
pub struct PageDeps {
    pub probe: Arc<dyn HttpProbe>,
    pub sink: Arc<dyn RenderSink>,
    pub timing: Arc<dyn TimingSource>,
    pub context: PageContext,
    pub clicks: mpsc::Receiver<ClickEvent>,
    /// Where timing metrics go. `None` records them as analytics events.
    pub metrics: Option<Arc<dyn MetricsSink>>,
}

/// One hosted page: every component initialized independently, plus the
/// surface the surrounding glue calls into.
pub struct Page {
    config: WatchConfig,
    pub session: Arc<SessionIdentity>,
    pub status: Arc<StatusMonitor>,
    pub redirect: RedirectVerifier,
    pub analytics: Arc<AnalyticsCollector>,
    pub perf: Arc<PerformanceObserver>,
    tasks: Vec<TaskHandle>,
}

impl Page {
    /// Page-ready: starts polling, click tracking and resource observation,
    /// and emits the page view.
    pub fn start(config: WatchConfig, deps: PageDeps) -> Result<Self> {
        config.validate()?;

        let store: Box<dyn SessionStore> = match &config.session_file {
            Some(path) => Box::new(FileSessionStore::open(path)?),
            None => Box::new(MemorySessionStore::new()),
        };
        let session = Arc::new(SessionIdentity::new(store));

        let analytics = Arc::new(AnalyticsCollector::new(
            Arc::clone(&session),
            Arc::new(crate::telemetry::EventBuffer::new()),
            config.trackable_class.clone(),
        ));

        let status = Arc::new(StatusMonitor::new(
            Arc::clone(&deps.probe),
            Arc::clone(&deps.sink),
            config.health_url.clone(),
            config.poll_timeout(),
        ));

        let redirect = RedirectVerifier::new(
            Arc::clone(&deps.probe),
            Arc::clone(&deps.sink),
            config.redirect_timeout(),
            config.notification_ttl(),
        );

        let metrics: Arc<dyn MetricsSink> = match deps.metrics {
            Some(m) => m,
            None => Arc::clone(&analytics) as Arc<dyn MetricsSink>,
        };
        let perf = Arc::new(PerformanceObserver::new(deps.timing, metrics));

        let mut tasks = Vec::new();
        tasks.push(status.spawn(config.poll_interval()));
        analytics.init(&deps.context);
        tasks.push(analytics.attach_clicks(deps.clicks));
        if let Some(handle) = perf.observe_resources() {
            tasks.push(handle);
        }

        info!(health_url = %config.health_url, "page components initialized");

        Ok(Self {
            config,
            session,
            status,
            redirect,
            analytics,
            perf,
            tasks,
        })
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub async fn check_status(&self) -> StatusReport {
        self.status.poll().await
    }

    /// Runs the configured redirect test.
    pub async fn test_redirect(&self) -> RedirectCheckResult {
        let target = &self.config.redirect;
        self.redirect
            .test_redirect(&target.source_url, &target.expected_target)
            .await
    }

    pub fn track(&self, name: &str, payload: Payload) -> Event {
        self.analytics.track(name, payload)
    }

    pub fn show_loading(&self) {
        self.redirect.show_loading(self.config.loading_flash());
    }

    /// Load event: records the navigation snapshot.
    pub fn on_load(&self) -> Option<PerformanceSnapshot> {
        self.perf.capture_page_load()
    }

    /// Page teardown. Stops every long-lived task and waits for them.
    pub async fn shutdown(self) {
        for task in self.tasks {
            task.shutdown().await;
        }
        info!("page torn down");
    }
}
