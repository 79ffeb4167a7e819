use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DOMAIN_MISMATCH_DETAIL: &str = "Target domain not found in redirect URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedirectOutcome {
    Success,
    DomainMismatch,
    UnexpectedStatus,
    NetworkFailure,
}

/// Result of one redirect probe. Rendered once, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectCheckResult {
    pub outcome: RedirectOutcome,
    pub detail: String,
}

impl RedirectCheckResult {
    pub fn new(outcome: RedirectOutcome, detail: impl Into<String>) -> Self {
        Self {
            outcome,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

/// Transient alert posted to the page for one redirect test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn for_result(result: &RedirectCheckResult) -> Self {
        let (kind, title, message) = match result.outcome {
            RedirectOutcome::Success => (
                NotificationKind::Success,
                "Redirect working correctly!",
                format!("Redirected to: {}", result.detail),
            ),
            RedirectOutcome::DomainMismatch => (
                NotificationKind::Error,
                "Redirect failed",
                result.detail.clone(),
            ),
            RedirectOutcome::UnexpectedStatus => (
                NotificationKind::Warning,
                "Unexpected response",
                format!("HTTP Status: {}", result.detail),
            ),
            RedirectOutcome::NetworkFailure => {
                (NotificationKind::Error, "Test failed", result.detail.clone())
            }
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.to_string(),
            message,
        }
    }
}
