pub mod config;
pub mod error;
pub mod host;
pub mod kernel;
pub mod monitor;
pub mod page;
pub mod perf;
pub mod redirect;
pub mod session;
pub mod telemetry;

// Re-export specific items for convenient access
pub use config::WatchConfig;
pub use error::WatchError;
pub use page::{Page, PageDeps};
