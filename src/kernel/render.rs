use std::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::monitor::types::{StatusReport, StatusState};
use crate::redirect::types::{Notification, NotificationKind};

/// Presentation target owned by the hosting page.
/// Components only ever talk to the page through this seam.
pub trait RenderSink: Send + Sync {
    fn render_status(&self, report: &StatusReport);
    fn set_loading(&self, visible: bool);
    fn show_notification(&self, notification: &Notification);
    fn dismiss_notification(&self, id: Uuid);
}

/// Headless sink that renders everything as log lines.
#[derive(Debug, Default)]
pub struct TracingRenderSink;

impl RenderSink for TracingRenderSink {
    fn render_status(&self, report: &StatusReport) {
        match report.state {
            StatusState::Active => info!(state = ?report.state, "{}: {}", report.label, report.description),
            _ => warn!(state = ?report.state, "{}: {}", report.label, report.description),
        }
    }

    fn set_loading(&self, visible: bool) {
        info!(visible, "loading indicator");
    }

    fn show_notification(&self, n: &Notification) {
        match n.kind {
            NotificationKind::Success => info!(id = %n.id, "{} {}", n.title, n.message),
            NotificationKind::Warning | NotificationKind::Error => {
                warn!(id = %n.id, kind = ?n.kind, "{} {}", n.title, n.message)
            }
        }
    }

    fn dismiss_notification(&self, id: Uuid) {
        tracing::debug!(%id, "notification dismissed");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderFrame {
    Status(StatusReport),
    Loading(bool),
    Shown(Notification),
    Dismissed(Uuid),
}

/// Sink that records every call in order. Used by tests and by hosts that
/// want to replay what the page showed.
#[derive(Debug, Default)]
pub struct RecordingRenderSink {
    frames: Mutex<Vec<RenderFrame>>,
}

impl RecordingRenderSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, frame: RenderFrame) {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).push(frame);
    }

    pub fn frames(&self) -> Vec<RenderFrame> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last_status(&self) -> Option<StatusReport> {
        self.frames().into_iter().rev().find_map(|f| match f {
            RenderFrame::Status(r) => Some(r),
            _ => None,
        })
    }

    pub fn loading(&self) -> bool {
        self.frames()
            .into_iter()
            .rev()
            .find_map(|f| match f {
                RenderFrame::Loading(v) => Some(v),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Notifications shown and not yet dismissed, oldest first.
    pub fn visible_notifications(&self) -> Vec<Notification> {
        let frames = self.frames();
        let dismissed: Vec<Uuid> = frames
            .iter()
            .filter_map(|f| match f {
                RenderFrame::Dismissed(id) => Some(*id),
                _ => None,
            })
            .collect();
        frames
            .into_iter()
            .filter_map(|f| match f {
                RenderFrame::Shown(n) if !dismissed.contains(&n.id) => Some(n),
                _ => None,
            })
            .collect()
    }
}

impl RenderSink for RecordingRenderSink {
    fn render_status(&self, report: &StatusReport) {
        self.push(RenderFrame::Status(report.clone()));
    }

    fn set_loading(&self, visible: bool) {
        self.push(RenderFrame::Loading(visible));
    }

    fn show_notification(&self, notification: &Notification) {
        self.push(RenderFrame::Shown(notification.clone()));
    }

    fn dismiss_notification(&self, id: Uuid) {
        self.push(RenderFrame::Dismissed(id));
    }
}
