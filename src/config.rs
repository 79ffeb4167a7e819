use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, WatchError};

pub const DEFAULT_HEALTH_URL: &str = "http://127.0.0.1:8080/health";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 5;
pub const DEFAULT_LOADING_FLASH_SECS: u64 = 3;
pub const DEFAULT_REDIRECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_TRACKABLE_CLASS: &str = "btn";

/// Runtime configuration for one hosted page.
/// Every field has a default so a partial JSON file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub health_url: String,
    pub poll_interval_secs: u64,
    pub poll_timeout_secs: u64,
    pub notification_ttl_secs: u64,
    pub loading_flash_secs: u64,
    pub trackable_class: String,
    pub redirect: RedirectConfig,
    /// Where the per-tab session entry lives. `None` keeps it in memory.
    pub session_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    pub source_url: String,
    pub expected_target: String,
    pub timeout_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            health_url: DEFAULT_HEALTH_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL_SECS,
            loading_flash_secs: DEFAULT_LOADING_FLASH_SECS,
            trackable_class: DEFAULT_TRACKABLE_CLASS.to_string(),
            redirect: RedirectConfig::default(),
            session_file: None,
        }
    }
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            source_url: "http://127.0.0.1:8080/redirect".to_string(),
            expected_target: "example.com".to_string(),
            timeout_secs: DEFAULT_REDIRECT_TIMEOUT_SECS,
        }
    }
}

impl WatchConfig {
    /// Loads a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `PAGEWATCH_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key lookup. Split out so tests don't touch the real env.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PAGEWATCH_HEALTH_URL") {
            self.health_url = v;
        }
        if let Some(v) = lookup("PAGEWATCH_POLL_INTERVAL_SECS") {
            self.poll_interval_secs = parse_secs("PAGEWATCH_POLL_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("PAGEWATCH_POLL_TIMEOUT_SECS") {
            self.poll_timeout_secs = parse_secs("PAGEWATCH_POLL_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("PAGEWATCH_NOTIFICATION_TTL_SECS") {
            self.notification_ttl_secs = parse_secs("PAGEWATCH_NOTIFICATION_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("PAGEWATCH_LOADING_FLASH_SECS") {
            self.loading_flash_secs = parse_secs("PAGEWATCH_LOADING_FLASH_SECS", &v)?;
        }
        if let Some(v) = lookup("PAGEWATCH_TRACKABLE_CLASS") {
            self.trackable_class = v;
        }
        if let Some(v) = lookup("PAGEWATCH_REDIRECT_SOURCE") {
            self.redirect.source_url = v;
        }
        if let Some(v) = lookup("PAGEWATCH_REDIRECT_TARGET") {
            self.redirect.expected_target = v;
        }
        if let Some(v) = lookup("PAGEWATCH_REDIRECT_TIMEOUT_SECS") {
            self.redirect.timeout_secs = parse_secs("PAGEWATCH_REDIRECT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("PAGEWATCH_SESSION_FILE") {
            self.session_file = Some(PathBuf::from(v));
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(WatchError::Config("poll_interval_secs must be > 0".into()));
        }
        if self.poll_timeout_secs == 0 {
            return Err(WatchError::Config("poll_timeout_secs must be > 0".into()));
        }
        if self.redirect.timeout_secs == 0 {
            return Err(WatchError::Config("redirect.timeout_secs must be > 0".into()));
        }
        if self.trackable_class.trim().is_empty() {
            return Err(WatchError::Config("trackable_class must not be empty".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn loading_flash(&self) -> Duration {
        Duration::from_secs(self.loading_flash_secs)
    }

    pub fn redirect_timeout(&self) -> Duration {
        Duration::from_secs(self.redirect.timeout_secs)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| WatchError::Config(format!("{} is not a number of seconds: {:?}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: WatchConfig =
            serde_json::from_str(r#"{ "poll_interval_secs": 10, "redirect": { "expected_target": "good.example.com" } }"#)
                .unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.poll_timeout(), Duration::from_secs(5));
        assert_eq!(config.redirect.expected_target, "good.example.com");
        assert_eq!(config.trackable_class, "btn");
    }

    #[test]
    fn overrides_replace_fields() {
        let env: HashMap<&str, &str> = [
            ("PAGEWATCH_HEALTH_URL", "http://status.local/health"),
            ("PAGEWATCH_POLL_TIMEOUT_SECS", "2"),
        ]
        .into_iter()
        .collect();

        let config = WatchConfig::default()
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.health_url, "http://status.local/health");
        assert_eq!(config.poll_timeout_secs, 2);
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
    }

    #[test]
    fn every_duration_has_an_env_key() {
        let env: HashMap<&str, &str> = [
            ("PAGEWATCH_POLL_INTERVAL_SECS", "11"),
            ("PAGEWATCH_NOTIFICATION_TTL_SECS", "7"),
            ("PAGEWATCH_LOADING_FLASH_SECS", "1"),
            ("PAGEWATCH_REDIRECT_TIMEOUT_SECS", "9"),
        ]
        .into_iter()
        .collect();

        let config = WatchConfig::default()
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(11));
        assert_eq!(config.notification_ttl(), Duration::from_secs(7));
        assert_eq!(config.loading_flash(), Duration::from_secs(1));
        assert_eq!(config.redirect_timeout(), Duration::from_secs(9));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = WatchConfig::default()
            .apply_overrides(|k| (k == "PAGEWATCH_POLL_INTERVAL_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, WatchError::Config(_)));

        let err = WatchConfig::default()
            .apply_overrides(|k| (k == "PAGEWATCH_POLL_INTERVAL_SECS").then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, WatchError::Config(_)));

        let err = WatchConfig::default()
            .apply_overrides(|k| (k == "PAGEWATCH_REDIRECT_TIMEOUT_SECS").then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, WatchError::Config(_)));
    }
}
