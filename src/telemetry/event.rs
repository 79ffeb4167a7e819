use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kernel::time::{self, Timestamp};
use crate::session::SessionId;

pub const PAGE_VIEW: &str = "page_view";
pub const BUTTON_CLICK: &str = "button_click";
pub const PAGE_LOAD: &str = "page_load";
pub const RESOURCE_LOAD: &str = "resource_load";

pub type Payload = Map<String, Value>;

/// One recorded interaction or lifecycle occurrence. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event")]
    pub name: String,
    #[serde(rename = "data")]
    pub payload: Payload,
    #[serde(with = "time::iso_millis")]
    pub timestamp: Timestamp,
    #[serde(rename = "sessionId")]
    pub session_id: SessionId,
}

/// Where the page view came from. Empty strings are valid values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub path: String,
    pub referrer: String,
    pub user_agent: String,
}

impl PageContext {
    pub fn payload(&self) -> Payload {
        let mut data = Payload::new();
        data.insert("page".into(), Value::String(self.path.clone()));
        data.insert("referrer".into(), Value::String(self.referrer.clone()));
        data.insert("userAgent".into(), Value::String(self.user_agent.clone()));
        data
    }
}

/// A click as seen by the document-level listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
    pub classes: Vec<String>,
    pub text: String,
    pub href: Option<String>,
}

impl ClickEvent {
    pub fn new(classes: &[&str], text: impl Into<String>, href: Option<&str>) -> Self {
        Self {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            text: text.into(),
            href: href.map(str::to_string),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn payload(&self) -> Payload {
        let mut data = Payload::new();
        data.insert("button".into(), Value::String(self.text.clone()));
        data.insert(
            "href".into(),
            self.href.clone().map(Value::String).unwrap_or(Value::Null),
        );
        data
    }
}
