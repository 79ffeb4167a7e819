pub mod monitor;
pub mod types;

pub use monitor::StatusMonitor;
pub use types::{StatusReport, StatusState};
