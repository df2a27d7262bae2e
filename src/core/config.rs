//! Configuration management for gcm-dump.
//!
//! Values come from, in increasing priority:
//! - defaults
//! - a YAML config file
//! - environment variables and CLI arguments

use crate::core::{DumpError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default Cloud Monitoring API root.
pub const DEFAULT_ENDPOINT: &str = "https://monitoring.googleapis.com";

/// Read-only scope for `timeSeries.list`.
pub const MONITORING_READ_SCOPE: &str = "https://www.googleapis.com/auth/monitoring.read";

/// Complete configuration for gcm-dump
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Monitoring API settings
    pub api: ApiConfig,
    /// Credential settings
    pub auth: AuthConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Monitoring API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, without the `/v3` suffix
    pub endpoint: String,
    /// Timeout applied to every HTTP request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Upper bound for the whole run; unbounded when unset
    #[serde(with = "humantime_serde")]
    pub deadline: Option<Duration>,
    /// Series per page; the backend picks when unset
    pub page_size: Option<u32>,
}

/// Credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Static bearer token. Application Default Credentials are used when unset.
    pub access_token: Option<String>,
    /// OAuth scopes requested from Application Default Credentials
    pub scopes: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(60),
            deadline: None,
            page_size: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            access_token: None,
            scopes: vec![MONITORING_READ_SCOPE.to_string()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Warn,
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.api.endpoint).map_err(|e| {
            DumpError::config(format!("Invalid API endpoint '{}': {}", self.api.endpoint, e))
        })?;

        if self.api.request_timeout.is_zero() {
            return Err(DumpError::config("request_timeout must be greater than 0"));
        }

        if self.api.deadline.is_some_and(|d| d.is_zero()) {
            return Err(DumpError::config("deadline must be greater than 0"));
        }

        if self.api.page_size == Some(0) {
            return Err(DumpError::config("page_size must be greater than 0"));
        }

        if self.auth.access_token.is_none() && self.auth.scopes.is_empty() {
            return Err(DumpError::config(
                "at least one OAuth scope is required without an access token",
            ));
        }

        Ok(())
    }

    /// Default config file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("gcm-dump").join("config.yaml"))
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| DumpError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set API endpoint
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.api.endpoint = endpoint.into();
        self
    }

    /// Set per-request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.api.request_timeout = timeout;
        self
    }

    /// Set whole-run deadline
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config.api.deadline = Some(deadline);
        self
    }

    /// Set page size
    pub fn page_size(mut self, size: u32) -> Self {
        self.config.api.page_size = Some(size);
        self
    }

    /// Set static access token
    pub fn access_token<S: Into<String>>(mut self, token: S) -> Self {
        self.config.auth.access_token = Some(token.into());
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
