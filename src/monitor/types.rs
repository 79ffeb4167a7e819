use serde::{Deserialize, Serialize};

use crate::error::WatchError;

/// Presentation state of the service status card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    /// Health endpoint answered 2xx.
    Active,
    /// Health endpoint answered with anything else.
    Warning,
    /// The health request never completed.
    Error,
}

/// A fully rendered status. Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub state: StatusState,
    pub label: String,
    pub description: String,
}

impl StatusState {
    pub fn report(self) -> StatusReport {
        let (label, description) = match self {
            StatusState::Active => ("Service Status: Active", "All systems operational"),
            StatusState::Warning => ("Service Status: Warning", "Some issues detected"),
            StatusState::Error => ("Service Status: Error", "Service unavailable"),
        };
        StatusReport {
            state: self,
            label: label.to_string(),
            description: description.to_string(),
        }
    }

    /// Total mapping from a poll outcome to a state.
    pub fn classify(outcome: &Result<u16, WatchError>) -> Self {
        match outcome {
            Ok(code) if (200..300).contains(code) => StatusState::Active,
            Ok(_) => StatusState::Warning,
            Err(_) => StatusState::Error,
        }
    }
}
