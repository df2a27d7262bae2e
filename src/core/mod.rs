//! Core domain models, configuration and errors for gcm-dump.

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, AuthConfig, Config, ConfigBuilder, LogLevel};
pub use error::{DumpError, Result};
pub use types::{
    BucketLayout, BucketOptions, Distribution, Exemplar, ExplicitBuckets, ExponentialBuckets,
    LinearBuckets, Metric, MonitoredResource, PointInterval, Range, SourcePoint, TimeSeries,
    TypedValue,
};
