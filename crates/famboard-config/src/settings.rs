//! Suite settings: where the applications live and how long to wait.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. `famboard.toml` in the working directory (optional)
//! 3. `FAMBOARD_*` environment variables, nested with `__`
//!    (e.g. `FAMBOARD_WAITS__ARCHIVE_MS=60000`)
//!
//! `CI=true` and `GOREST_TOKEN` are read on top of that, the way CI
//! providers and the API service name them.

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format as _, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

pub const SETTINGS_FILE: &str = "famboard.toml";
pub const ENV_PREFIX: &str = "FAMBOARD_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteSettings {
    /// Entry document of the family app.
    pub app_url: String,

    /// Entry document used by the standalone login smoke tests.
    pub login_url: String,

    /// Base URL of the REST API under test.
    pub api_base_url: String,

    /// Bearer token for the REST API.
    pub api_token: Option<String>,

    /// Headless, full-speed browser when true.
    pub ci: bool,

    pub waits: WaitSettings,

    pub retry: RetrySettings,
}

impl Default for SuiteSettings {
    fn default() -> Self {
        Self {
            app_url: "http://localhost:5500/index.html".to_string(),
            login_url: "https://dinasagal.github.io/".to_string(),
            api_base_url: "https://gorest.co.in/public/v2".to_string(),
            api_token: None,
            ci: false,
            waits: WaitSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

/// Timeouts in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    pub default_ms: u64,
    pub poll_ms: u64,
    pub family_name_ms: u64,
    pub child_listing_ms: u64,
    pub child_listing_retry_ms: u64,
    pub completion_ms: u64,
    pub archive_ms: u64,
    pub calendar_grid_ms: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            default_ms: 30_000,
            poll_ms: 100,
            family_name_ms: 15_000,
            child_listing_ms: 25_000,
            child_listing_retry_ms: 20_000,
            completion_ms: 10_000,
            archive_ms: 45_000,
            calendar_grid_ms: 20_000,
        }
    }
}

impl WaitSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_ms)
    }
}

/// Bounded retry budget for eventually consistent UI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_ms: 500,
        }
    }
}

impl RetrySettings {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl SuiteSettings {
    /// Loads settings from the working directory and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    /// Loads settings using `path` as the optional settings file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(SuiteSettings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let mut settings: SuiteSettings = figment.extract()?;

        if std::env::var("CI").is_ok_and(|v| v == "true") {
            settings.ci = true;
        }
        if let Ok(token) = std::env::var("GOREST_TOKEN") {
            settings.api_token = Some(token);
        }
        settings.api_token = settings.api_token.filter(|t| !t.trim().is_empty());

        settings.validate()?;
        debug!(app_url = %settings.app_url, ci = settings.ci, "settings loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("app_url", &self.app_url),
            ("login_url", &self.login_url),
            ("api_base_url", &self.api_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidSettings(format!(
                    "{field} must be an http(s) URL, got '{url}'"
                )));
            }
        }

        if self.waits.poll_ms == 0 {
            return Err(ConfigError::InvalidSettings(
                "waits.poll_ms must be greater than zero".to_string(),
            ));
        }

        if self.retry.attempts == 0 {
            return Err(ConfigError::InvalidSettings(
                "retry.attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
