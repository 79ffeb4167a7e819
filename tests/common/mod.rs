#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use pagewatch::error::{Result, WatchError};
use pagewatch::kernel::probe::{HttpProbe, ProbeResponse};
use pagewatch::perf::{MetricsSink, PerformanceSnapshot, ResourceEntry};

/// Scripted health reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16),
    Fail(&'static str),
    Hang,
}

enum HeadReply {
    Respond(Result<ProbeResponse>),
    Hang,
}

/// In-process probe replaying queued replies. Empty queues answer 200 / 200.
#[derive(Default)]
pub struct ScriptedProbe {
    health: Mutex<VecDeque<Reply>>,
    heads: Mutex<VecDeque<HeadReply>>,
    head_delay: Duration,
    pub health_calls: AtomicUsize,
    pub head_calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_head_delay(delay: Duration) -> Self {
        Self {
            head_delay: delay,
            ..Self::default()
        }
    }

    pub fn push_health(&self, reply: Reply) {
        self.health.lock().unwrap().push_back(reply);
    }

    pub fn push_redirect(&self, status: u16, location: Option<&str>) {
        self.heads.lock().unwrap().push_back(HeadReply::Respond(Ok(ProbeResponse {
            status,
            location: location.map(str::to_string),
        })));
    }

    pub fn push_redirect_error(&self, message: &str) {
        self.heads
            .lock()
            .unwrap()
            .push_back(HeadReply::Respond(Err(WatchError::NetworkFailure(message.to_string()))));
    }

    /// The next redirect request never answers.
    pub fn push_redirect_hang(&self) {
        self.heads.lock().unwrap().push_back(HeadReply::Hang);
    }

    pub fn head_calls(&self) -> usize {
        self.head_calls.load(Ordering::SeqCst)
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpProbe for ScriptedProbe {
    async fn health(&self, _url: &str, _timeout: Duration) -> Result<u16> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.health.lock().unwrap().pop_front().unwrap_or(Reply::Status(200));
        match reply {
            Reply::Status(code) => Ok(code),
            Reply::Fail(msg) => Err(WatchError::NetworkFailure(msg.to_string())),
            Reply::Hang => std::future::pending::<Result<u16>>().await,
        }
    }

    async fn head_no_redirect(&self, _url: &str, _timeout: Duration) -> Result<ProbeResponse> {
        self.head_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.heads.lock().unwrap().pop_front();
        if !self.head_delay.is_zero() {
            tokio::time::sleep(self.head_delay).await;
        }
        match reply {
            Some(HeadReply::Respond(outcome)) => outcome,
            Some(HeadReply::Hang) => std::future::pending::<Result<ProbeResponse>>().await,
            None => Ok(ProbeResponse {
                status: 200,
                location: None,
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingMetrics {
    pub page_loads: Mutex<Vec<PerformanceSnapshot>>,
    pub resources: Mutex<Vec<ResourceEntry>>,
}

impl RecordingMetrics {
    pub fn resource_names(&self) -> Vec<String> {
        self.resources.lock().unwrap().iter().map(|r| r.name.clone()).collect()
    }
}

impl MetricsSink for RecordingMetrics {
    fn page_load(&self, snapshot: &PerformanceSnapshot) {
        self.page_loads.lock().unwrap().push(*snapshot);
    }

    fn resource(&self, entry: &ResourceEntry) {
        self.resources.lock().unwrap().push(entry.clone());
    }
}
