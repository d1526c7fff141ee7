//! Configuration types for gdddcd
//!
//! The configuration resource is a JSON object:
//!
//! ```json
//! {
//!   "hostname": "home.example.com",
//!   "username": "generated-user",
//!   "password": "generated-pass",
//!   "update_freq_s": 300,
//!   "ip_check_url": "https://domains.google.com/checkip",
//!   "user_agent": "gdddcd 1.0"
//! }
//! ```
//!
//! `hostname`, `username` and `password` are required. Every other field
//! falls back to a default, and each fallback is logged.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Seconds between checks when `update_freq_s` is unset or non-positive
pub const DEFAULT_UPDATE_FREQ_SECS: f64 = 60.0;

/// IP check endpoint used when `ip_check_url` is unset
pub const DEFAULT_IP_CHECK_URL: &str = "https://domains.google.com/checkip";

/// User-Agent used when `user_agent` is unset
pub const DEFAULT_USER_AGENT: &str = "gdddcd 1.0";

/// HTTP request timeout used when `http_timeout_s` is unset or non-positive
pub const DEFAULT_HTTP_TIMEOUT_SECS: f64 = 30.0;

/// On-disk shape. `null` and absent fields are treated the same.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    hostname: Option<String>,
    username: Option<String>,
    password: Option<String>,
    update_freq_s: Option<f64>,
    ip_check_url: Option<String>,
    user_agent: Option<String>,
    http_timeout_s: Option<f64>,
}

/// Validated, read-only configuration
#[derive(Clone, PartialEq)]
pub struct Config {
    hostname: String,
    username: String,
    password: String,
    update_freq_s: f64,
    ip_check_url: String,
    user_agent: String,
    http_timeout_s: f64,
}

// The password never reaches logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("update_freq_s", &self.update_freq_s)
            .field("ip_check_url", &self.ip_check_url)
            .field("user_agent", &self.user_agent)
            .field("http_timeout_s", &self.http_timeout_s)
            .finish()
    }
}

impl Config {
    /// Read and validate the configuration file at `path`
    ///
    /// The file is only read, never modified.
    ///
    /// # Errors
    ///
    /// - `Error::Config("read failed: ...")` if the file cannot be read
    /// - `Error::Config("parse failed: ...")` if it is not a JSON object of the expected shape
    /// - `Error::MissingField(name)` if `hostname`, `username` or `password` is empty
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::config(format!("read failed: {}: {}", path.display(), e)))?;

        Self::from_json(&bytes)
    }

    /// Parse and validate configuration from raw JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let raw: RawConfig = serde_json::from_slice(bytes)
            .map_err(|e| Error::config(format!("parse failed: {}", e)))?;

        let hostname = required(raw.hostname, "hostname")?;
        let username = required(raw.username, "username")?;
        let password = required(raw.password, "password")?;

        let update_freq_s = match raw.update_freq_s {
            Some(secs) if secs > 0.0 => secs,
            _ => {
                info!(
                    "update_freq_s unspecified (or non-positive) in config, using default of {}",
                    DEFAULT_UPDATE_FREQ_SECS
                );
                DEFAULT_UPDATE_FREQ_SECS
            }
        };
        checked_duration(update_freq_s, "update_freq_s")?;

        let ip_check_url = match raw.ip_check_url {
            Some(url) if !url.is_empty() => url,
            _ => {
                info!(
                    "ip_check_url unspecified in config, using default of {}",
                    DEFAULT_IP_CHECK_URL
                );
                DEFAULT_IP_CHECK_URL.to_string()
            }
        };

        let user_agent = match raw.user_agent {
            Some(agent) if !agent.is_empty() => agent,
            _ => {
                info!(
                    "user_agent unspecified in config, using default of {}",
                    DEFAULT_USER_AGENT
                );
                DEFAULT_USER_AGENT.to_string()
            }
        };

        let http_timeout_s = match raw.http_timeout_s {
            Some(secs) if secs > 0.0 => secs,
            _ => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        checked_duration(http_timeout_s, "http_timeout_s")?;

        Ok(Self {
            hostname,
            username,
            password,
            update_freq_s,
            ip_check_url,
            user_agent,
            http_timeout_s,
        })
    }

    /// Hostname whose record is kept up to date
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Provider username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Provider password
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Seconds between checks (always positive)
    pub fn update_freq_s(&self) -> f64 {
        self.update_freq_s
    }

    /// URL of the "what is my IP" service
    pub fn ip_check_url(&self) -> &str {
        &self.ip_check_url
    }

    /// User-Agent sent on every outbound request
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Period of the reconciliation loop
    pub fn update_interval(&self) -> Duration {
        // Range checked in from_json.
        Duration::from_secs_f64(self.update_freq_s)
    }

    /// Timeout applied to each outbound HTTP request
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.http_timeout_s)
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::MissingField(name)),
    }
}

/// Convert seconds to a `Duration`, rejecting values that overflow or round down to zero
fn checked_duration(secs: f64, field: &'static str) -> Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(Error::config(format!("{} out of range: {}", field, secs))),
    }
}
