//! Configuration loading tests.

use clap::Parser;
use gcm_dump::cli::Cli;
use gcm_dump::core::{Config, ConfigBuilder, LogLevel};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.api.endpoint, "https://monitoring.googleapis.com");
    assert_eq!(config.api.request_timeout, Duration::from_secs(60));
    assert_eq!(config.api.deadline, None);
    assert_eq!(config.api.page_size, None);
    assert!(config.auth.access_token.is_none());
    assert_eq!(config.logging.level, LogLevel::Warn);
}

#[test]
fn test_yaml_config() {
    let yaml = r#"
api:
  endpoint: http://localhost:8085
  request_timeout: 15s
  deadline: 2m
  page_size: 500
auth:
  scopes:
    - https://www.googleapis.com/auth/monitoring
logging:
  level: info
"#;

    let config = ConfigBuilder::new().from_yaml(yaml).unwrap().build().unwrap();

    assert_eq!(config.api.endpoint, "http://localhost:8085");
    assert_eq!(config.api.request_timeout, Duration::from_secs(15));
    assert_eq!(config.api.deadline, Some(Duration::from_secs(120)));
    assert_eq!(config.api.page_size, Some(500));
    assert_eq!(config.auth.scopes, vec!["https://www.googleapis.com/auth/monitoring"]);
    assert_eq!(config.logging.level, LogLevel::Info);
}

#[test]
fn test_invalid_config() {
    assert!(ConfigBuilder::new().endpoint("not a url").build().is_err());
    assert!(ConfigBuilder::new().page_size(0).build().is_err());
    assert!(ConfigBuilder::new().request_timeout(Duration::ZERO).build().is_err());
    assert!(ConfigBuilder::new().from_yaml("api: [1, 2]").is_err());
}

#[tokio::test]
async fn test_load_config_file_with_cli_overrides() {
    let file = config_file(
        r#"
api:
  endpoint: http://localhost:8085
  request_timeout: 15s
  page_size: 500
"#,
    );
    let path = file.path().to_str().unwrap();

    let cli = Cli::try_parse_from(["gcm-dump", "--config", path, "--page-size", "20"]).unwrap();
    let config = cli.load_config().await.unwrap();

    assert_eq!(config.api.endpoint, "http://localhost:8085");
    assert_eq!(config.api.request_timeout, Duration::from_secs(15));
    assert_eq!(config.api.page_size, Some(20));
}

#[tokio::test]
async fn test_missing_explicit_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");

    let cli = Cli::try_parse_from(["gcm-dump", "-c", missing.to_str().unwrap()]).unwrap();
    let err = cli.load_config().await.unwrap_err();

    assert_eq!(err.category(), "config");
}
