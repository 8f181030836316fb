//! Guard configuration
//!
//! Read once at process start, either from environment variables or from
//! a YAML file (CLI use). Every field has a documented fallback; the
//! credential defaults are non-secret placeholders and must be replaced
//! with real secret injection in any production deployment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Target base URL environment variable
pub const ENV_BASE_URL: &str = "SCANGUARD_BASE_URL";
/// Login path environment variable
pub const ENV_LOGIN_PATH: &str = "SCANGUARD_LOGIN_PATH";
/// Login email environment variable
pub const ENV_EMAIL: &str = "SCANGUARD_EMAIL";
/// Login password environment variable
pub const ENV_PASSWORD: &str = "SCANGUARD_PASSWORD";
/// Login call timeout environment variable (seconds)
pub const ENV_TIMEOUT_SECS: &str = "SCANGUARD_TIMEOUT_SECS";
/// Proactive refresh margin environment variable (seconds)
pub const ENV_REFRESH_MARGIN_SECS: &str = "SCANGUARD_REFRESH_MARGIN_SECS";

/// Configuration for the session guard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Base URL of the protected target; only URIs under this prefix are
    /// ever injected or invalidated
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the login endpoint, relative to the base URL
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Login email
    #[serde(default = "default_email")]
    pub email: String,

    /// Login password
    #[serde(default = "default_password")]
    pub password: String,

    /// Timeout applied to the login call, matching the policy of
    /// ordinary outbound requests
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Safety margin before token expiry that triggers a proactive
    /// re-login
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: i64,

    /// Referer value for injected requests; the base URL when unset
    #[serde(default)]
    pub referer: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_email() -> String {
    "scanner@example.com".to_string()
}

fn default_password() -> String {
    "scanner-password".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_refresh_margin_secs() -> i64 {
    30
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_path: default_login_path(),
            email: default_email(),
            password: default_password(),
            timeout_secs: default_timeout_secs(),
            refresh_margin_secs: default_refresh_margin_secs(),
            referer: None,
        }
    }
}

impl ScanConfig {
    /// Load configuration from environment variables, falling back to
    /// the documented defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = env::var(ENV_BASE_URL) {
            config.base_url = value;
        }
        if let Ok(value) = env::var(ENV_LOGIN_PATH) {
            config.login_path = value;
        }
        if let Ok(value) = env::var(ENV_EMAIL) {
            config.email = value;
        }
        if let Ok(value) = env::var(ENV_PASSWORD) {
            config.password = value;
        }
        if let Ok(value) = env::var(ENV_TIMEOUT_SECS) {
            match value.parse() {
                Ok(secs) => config.timeout_secs = secs,
                Err(_) => warn!(%value, "ignoring unparseable {ENV_TIMEOUT_SECS}"),
            }
        }
        if let Ok(value) = env::var(ENV_REFRESH_MARGIN_SECS) {
            match value.parse() {
                Ok(secs) => config.refresh_margin_secs = secs,
                Err(_) => warn!(%value, "ignoring unparseable {ENV_REFRESH_MARGIN_SECS}"),
            }
        }

        config
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)?;
        if !self.login_path.starts_with('/') {
            return Err(Error::config(format!(
                "login_path must start with '/': {}",
                self.login_path
            )));
        }
        if self.email.is_empty() {
            return Err(Error::missing_field("email"));
        }
        if self.password.is_empty() {
            return Err(Error::missing_field("password"));
        }
        Ok(())
    }

    /// Full URL of the login endpoint.
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.login_path)
    }

    /// Login call timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Proactive refresh margin.
    pub fn refresh_margin(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_margin_secs)
    }
}
