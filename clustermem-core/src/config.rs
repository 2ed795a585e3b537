//! Connection configuration for the management endpoint
//!
//! Values come from built-in defaults, `CLUSTERMEM_*` environment variables
//! and an optional TOML file. Environment variables override the file; the
//! command line overrides both.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{ClusterMemError, ClusterMemResult};

pub const DEFAULT_URL: &str = "https://127.0.0.1/sdk";
pub const DEFAULT_USER: &str = "administrator@vsphere.local";
pub const DEFAULT_API_RELEASE: &str = "8.0.1.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Parse an environment variable as a typed value with a default fallback
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Settings needed to open a session against the management endpoint
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// SDK URL of the vCenter or ESXi endpoint
    pub url: String,

    /// Login user name
    pub user: String,

    /// Login password; never written back out
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Accept self-signed or otherwise invalid TLS certificates
    pub insecure: bool,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// VI/JSON API release segment, e.g. `8.0.1.0`
    pub api_release: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: env_var_or_default("CLUSTERMEM_URL", DEFAULT_URL.to_string()),
            user: env_var_or_default("CLUSTERMEM_USER", DEFAULT_USER.to_string()),
            password: env::var("CLUSTERMEM_PASSWORD").ok(),
            insecure: env_var_or_default("CLUSTERMEM_INSECURE", false),
            request_timeout: Duration::from_secs(env_var_or_default(
                "CLUSTERMEM_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            api_release: env_var_or_default(
                "CLUSTERMEM_API_RELEASE",
                DEFAULT_API_RELEASE.to_string(),
            ),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("insecure", &self.insecure)
            .field("request_timeout", &self.request_timeout)
            .field("api_release", &self.api_release)
            .finish()
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> ClusterMemResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClusterMemError::configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> ClusterMemResult<Self> {
        toml::from_str(contents)
            .map_err(|e| ClusterMemError::configuration(format!("Failed to parse TOML: {}", e)))
    }

    /// Apply environment variable overrides on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("CLUSTERMEM_URL") {
            self.url = url;
        }
        if let Ok(user) = env::var("CLUSTERMEM_USER") {
            self.user = user;
        }
        if let Ok(password) = env::var("CLUSTERMEM_PASSWORD") {
            self.password = Some(password);
        }
        if let Some(insecure) = env::var("CLUSTERMEM_INSECURE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.insecure = insecure;
        }
        if let Some(secs) = env::var("CLUSTERMEM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(release) = env::var("CLUSTERMEM_API_RELEASE") {
            self.api_release = release;
        }
    }

    /// Parse and check the endpoint URL
    pub fn endpoint(&self) -> ClusterMemResult<url::Url> {
        let endpoint = url::Url::parse(&self.url).map_err(|e| {
            ClusterMemError::invalid_input("url", format!("'{}' is not a valid URL: {}", self.url, e))
        })?;

        match endpoint.scheme() {
            "http" | "https" => Ok(endpoint),
            scheme => Err(ClusterMemError::invalid_input(
                "url",
                format!("unsupported scheme '{}', expected http or https", scheme),
            )),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ClusterMemResult<()> {
        self.endpoint()?;

        if self.user.trim().is_empty() {
            return Err(ClusterMemError::invalid_input("user", "must not be empty"));
        }

        match &self.password {
            Some(password) if !password.is_empty() => {}
            _ => {
                return Err(ClusterMemError::invalid_input(
                    "password",
                    "a password is required to log in",
                ))
            }
        }

        if self.request_timeout.is_zero() {
            return Err(ClusterMemError::invalid_input(
                "request_timeout",
                "must be greater than zero",
            ));
        }

        if self.api_release.trim().is_empty() {
            return Err(ClusterMemError::invalid_input("api_release", "must not be empty"));
        }

        Ok(())
    }
}
