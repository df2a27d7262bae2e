//! Command-line interface for gcm-dump.
//!
//! `gcm-dump --project P --metricType M --resourceType R` prints the last ten
//! minutes of matching series, one JSON array per line.

use crate::application::{dump_time_series, run_with_deadline};
use crate::core::{Config, ConfigBuilder, DumpError, LogLevel, Result};
use crate::export::SeriesEmitter;
use crate::fetch::{Credentials, MonitoringClient};
use crate::query::{ListTimeSeriesRequest, TimeInterval, DEFAULT_WINDOW};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Dump Cloud Monitoring time series as JSON lines
#[derive(Parser, Debug)]
#[command(name = "gcm-dump")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// GCP project
    #[arg(long, env = "GCM_DUMP_PROJECT", default_value = "")]
    pub project: String,

    /// Type of metric
    #[arg(
        long = "metricType",
        visible_alias = "metric-type",
        env = "GCM_DUMP_METRIC_TYPE",
        default_value = ""
    )]
    pub metric_type: String,

    /// Type of resource
    #[arg(
        long = "resourceType",
        visible_alias = "resource-type",
        env = "GCM_DUMP_RESOURCE_TYPE",
        default_value = ""
    )]
    pub resource_type: String,

    /// Start time (unix time, default: ten minutes before end)
    #[arg(long, env = "GCM_DUMP_START", allow_negative_numbers = true)]
    pub start: Option<i64>,

    /// End time (unix time, default: now)
    #[arg(long, env = "GCM_DUMP_END", allow_negative_numbers = true)]
    pub end: Option<i64>,

    /// Configuration file path (default: ~/.config/gcm-dump/config.yaml)
    #[arg(short, long, env = "GCM_DUMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Monitoring API root
    #[arg(long, env = "GCM_DUMP_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Static bearer token instead of Application Default Credentials
    #[arg(long, env = "GCM_DUMP_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Series per page
    #[arg(long, env = "GCM_DUMP_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Per-request timeout, e.g. "30s"
    #[arg(long, env = "GCM_DUMP_TIMEOUT", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Upper bound for the whole run, e.g. "5m"
    #[arg(long, env = "GCM_DUMP_DEADLINE", value_parser = parse_duration)]
    pub deadline: Option<Duration>,

    /// Enable debug logging
    #[arg(short, long, env = "GCM_DUMP_DEBUG")]
    pub debug: bool,
}

fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments and environment variables (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => Config::default_path().filter(|path| path.exists()),
        };

        if let Some(path) = config_path {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    builder = builder.from_yaml(&content)?;
                    tracing::debug!("Loaded configuration from: {:?}", path);
                },
                Err(e) if self.config.is_some() => {
                    return Err(DumpError::config(format!(
                        "Failed to read config file {:?}: {}",
                        path, e
                    )));
                },
                Err(e) => {
                    tracing::debug!("Skipping config file {:?}: {}", path, e);
                },
            }
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint.clone());
        }
        if let Some(token) = &self.access_token {
            builder = builder.access_token(token.clone());
        }
        if let Some(size) = self.page_size {
            builder = builder.page_size(size);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.request_timeout(timeout);
        }
        if let Some(deadline) = self.deadline {
            builder = builder.deadline(deadline);
        }

        if self.debug {
            builder = builder.log_level(LogLevel::Debug);
        }

        builder.build()
    }

    /// Time window to query. Missing bounds default to the ten minutes
    /// ending at `now`.
    pub fn interval(&self, now: DateTime<Utc>) -> Result<TimeInterval> {
        let default = TimeInterval::trailing(now, DEFAULT_WINDOW);
        let start = self.start.unwrap_or_else(|| default.start().timestamp());
        let end = self.end.unwrap_or_else(|| default.end().timestamp());
        TimeInterval::from_unix(start, end)
    }

    /// Build the request for these arguments.
    pub fn request(&self, config: &Config, now: DateTime<Utc>) -> Result<ListTimeSeriesRequest> {
        let interval = self.interval(now)?;
        let request = ListTimeSeriesRequest::new(
            &self.project,
            &self.metric_type,
            &self.resource_type,
            interval,
        );
        Ok(request.with_page_size(config.api.page_size))
    }

    /// Initialize logging. Logs go to stderr; stdout carries only data.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact();

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| DumpError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute a gcm-dump run.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config().await?;
    cli.init_logging(&config)?;

    let request = cli.request(&config, Utc::now())?;

    let credentials = Credentials::from_config(&config.auth).await?;
    let client = MonitoringClient::new(&config.api, credentials)?;

    let stdout = std::io::stdout();
    let mut emitter = SeriesEmitter::new(stdout.lock());

    run_with_deadline(config.api.deadline, dump_time_series(&client, &request, &mut emitter))
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_no_flags_uses_trailing_ten_minutes() {
        let cli = Cli::try_parse_from(["gcm-dump"]).unwrap();
        let now = Utc.timestamp_opt(1_700_000_600, 250_000_000).unwrap();

        let interval = cli.interval(now).unwrap();

        assert_eq!(interval.end().timestamp(), 1_700_000_600);
        assert_eq!(interval.start().timestamp(), 1_700_000_000);
        assert_eq!(cli.project, "");
        assert_eq!(cli.metric_type, "");
        assert_eq!(cli.resource_type, "");
    }

    #[test]
    fn test_flag_names() {
        let cli = Cli::try_parse_from([
            "gcm-dump",
            "--project",
            "demo",
            "--metricType",
            "compute.googleapis.com/instance/uptime",
            "--resource-type",
            "gce_instance",
            "--start",
            "100",
            "--end",
            "200",
        ])
        .unwrap();

        assert_eq!(cli.project, "demo");
        assert_eq!(cli.metric_type, "compute.googleapis.com/instance/uptime");
        assert_eq!(cli.resource_type, "gce_instance");

        let interval = cli.interval(Utc::now()).unwrap();
        assert_eq!(interval.start().timestamp(), 100);
        assert_eq!(interval.end().timestamp(), 200);
    }

    #[test]
    fn test_only_end_given() {
        let cli = Cli::try_parse_from(["gcm-dump", "--end", "5000"]).unwrap();
        let now = Utc.timestamp_opt(9000, 0).unwrap();
        let interval = cli.interval(now).unwrap();

        // start still defaults relative to invocation time
        assert_eq!(interval.start().timestamp(), 8400);
        assert_eq!(interval.end().timestamp(), 5000);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "gcm-dump",
            "--endpoint",
            "http://127.0.0.1:9999",
            "--timeout",
            "5s",
            "--deadline",
            "1m",
            "--page-size",
            "50",
            "--access-token",
            "tok",
        ])
        .unwrap();

        let config = cli.build_config_from_args(ConfigBuilder::new()).unwrap();

        assert_eq!(config.api.endpoint, "http://127.0.0.1:9999");
        assert_eq!(config.api.request_timeout, Duration::from_secs(5));
        assert_eq!(config.api.deadline, Some(Duration::from_secs(60)));
        assert_eq!(config.api.page_size, Some(50));
        assert_eq!(config.auth.access_token.as_deref(), Some("tok"));

        let request = cli.request(&config, Utc::now()).unwrap();
        assert_eq!(request.page_size, Some(50));
    }

    #[test]
    fn test_debug_flag_overrides_configured_level() {
        let builder = ConfigBuilder::new().from_yaml("logging:\n  level: error\n").unwrap();

        let quiet = Cli::try_parse_from(["gcm-dump"]).unwrap();
        let config = quiet.build_config_from_args(builder.clone()).unwrap();
        assert_eq!(config.logging.level, LogLevel::Error);

        let debug = Cli::try_parse_from(["gcm-dump", "--debug"]).unwrap();
        let config = debug.build_config_from_args(builder).unwrap();
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_bad_duration_rejected() {
        assert!(Cli::try_parse_from(["gcm-dump", "--timeout", "soon"]).is_err());
    }
}
