//! gcm-dump - Cloud Monitoring time series as JSON lines.
//!
//! Lists the time series matching a metric type and resource type over a
//! time window, flattens every point (distribution histograms included) and
//! prints one JSON array per series to stdout.
//!
//! # Architecture
//!
//! - `query`: `timeSeries.list` request construction
//! - `fetch`: paged retrieval from the Monitoring REST API
//! - `flatten`: series to labeled, single-valued points
//! - `export`: JSON line encoding
//! - `application`: the sequential fetch/flatten/emit loop
//! - `core`: source model, configuration and errors
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use gcm_dump::application::dump_time_series;
//! use gcm_dump::core::Config;
//! use gcm_dump::export::SeriesEmitter;
//! use gcm_dump::fetch::{Credentials, MonitoringClient};
//! use gcm_dump::query::{ListTimeSeriesRequest, TimeInterval, DEFAULT_WINDOW};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let credentials = Credentials::from_config(&config.auth).await?;
//!     let client = MonitoringClient::new(&config.api, credentials)?;
//!
//!     let interval = TimeInterval::trailing(chrono::Utc::now(), DEFAULT_WINDOW);
//!     let request = ListTimeSeriesRequest::new(
//!         "my-project",
//!         "compute.googleapis.com/instance/cpu/utilization",
//!         "gce_instance",
//!         interval,
//!     );
//!
//!     let mut emitter = SeriesEmitter::new(std::io::stdout().lock());
//!     dump_time_series(&client, &request, &mut emitter).await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod application;
pub mod cli;
pub mod core;
pub mod export;
pub mod fetch;
pub mod flatten;
pub mod query;

// Re-export core types for convenience
pub use crate::core::{Config, DumpError, Result};
