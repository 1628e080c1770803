//! Application configuration.
//!
//! Settings come from an optional TOML file, then environment variables
//! (after loading `.env`) override individual fields.

mod roster;

pub use roster::{Roster, StreamerConfig};

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::notification::WebhookConfig;
use crate::{Error, Result};

pub const ENV_API_BASE_URL: &str = "KICKWATCH_API_BASE_URL";
pub const ENV_POLL_INTERVAL: &str = "KICKWATCH_POLL_INTERVAL";
pub const ENV_ROSTER: &str = "KICKWATCH_ROSTER";
pub const ENV_PREFERENCES: &str = "KICKWATCH_PREFERENCES";

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the Kick API (without the version segment).
    pub api_base_url: String,
    /// Base URL used to build channel links.
    pub site_base_url: String,
    /// Per-request timeout in seconds (0 disables it).
    pub request_timeout_secs: u64,
    /// Seconds between poll ticks.
    pub poll_interval_secs: u64,
    /// Upper bound for a whole tick in seconds (0 disables it).
    pub tick_timeout_secs: u64,
    /// Query the videos endpoint for the last stream time of offline channels.
    pub recent_videos_lookup: bool,
    /// Path of the roster TOML file.
    pub roster_path: PathBuf,
    /// Path of the notification preference file.
    pub preferences_path: PathBuf,
    /// Log filter directive overriding the default.
    pub log_filter: Option<String>,
    /// Directory for rotated log files; console only when unset.
    pub log_dir: Option<PathBuf>,
    /// Optional webhook that receives live notifications.
    pub webhook: Option<WebhookConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: kick_api::DEFAULT_API_BASE.to_string(),
            site_base_url: kick_api::DEFAULT_SITE_BASE.to_string(),
            request_timeout_secs: 10,
            poll_interval_secs: 60,
            tick_timeout_secs: 0,
            recent_videos_lookup: true,
            roster_path: PathBuf::from("roster.toml"),
            preferences_path: PathBuf::from("notifications.json"),
            log_filter: None,
            log_dir: None,
            webhook: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional file, apply environment overrides
    /// and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(interval) = lookup(ENV_POLL_INTERVAL) {
            self.poll_interval_secs = interval.trim().parse().map_err(|_| {
                Error::config(format!("{ENV_POLL_INTERVAL} must be a number of seconds"))
            })?;
        }
        if let Some(path) = lookup(ENV_ROSTER) {
            self.roster_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_PREFERENCES) {
            self.preferences_path = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(Error::config("poll_interval_secs must be greater than zero"));
        }
        for (name, value) in [
            ("api_base_url", &self.api_base_url),
            ("site_base_url", &self.site_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::config(format!("invalid {name} '{value}': {e}")))?;
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn tick_timeout(&self) -> Option<Duration> {
        (self.tick_timeout_secs > 0).then(|| Duration::from_secs(self.tick_timeout_secs))
    }

    /// Render the effective configuration as TOML.
    pub fn show(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Other(e.to_string()))
    }
}
