//! Time series retrieval.
//!
//! A [`TimeSeriesSource`] turns one [`ListTimeSeriesRequest`] into a lazy,
//! forward-only stream of series. An `Err` item is terminal: sources stop
//! yielding after it and callers are expected to stop polling.

pub mod auth;
pub mod rest;

use futures::stream::BoxStream;

use crate::core::{DumpError, Result, TimeSeries};
use crate::query::ListTimeSeriesRequest;

pub use auth::Credentials;
pub use rest::MonitoringClient;

/// Anything that can list time series for a request.
pub trait TimeSeriesSource {
    /// Stream every series matching `request`, in backend order.
    fn list_time_series<'a>(
        &'a self,
        request: &'a ListTimeSeriesRequest,
    ) -> BoxStream<'a, Result<TimeSeries>>;
}

/// In-memory source, mostly for tests and dry runs.
///
/// Yields the given items in order and stops after the first error.
#[derive(Debug, Default)]
pub struct StaticSource {
    items: Vec<StaticItem>,
}

#[derive(Debug, Clone)]
enum StaticItem {
    Series(TimeSeries),
    Failure(String),
}

impl StaticSource {
    pub fn new(series: Vec<TimeSeries>) -> Self {
        Self {
            items: series.into_iter().map(StaticItem::Series).collect(),
        }
    }

    /// Append a fetch failure after the series added so far.
    pub fn then_fail<S: Into<String>>(mut self, message: S) -> Self {
        self.items.push(StaticItem::Failure(message.into()));
        self
    }
}

impl TimeSeriesSource for StaticSource {
    fn list_time_series<'a>(
        &'a self,
        _request: &'a ListTimeSeriesRequest,
    ) -> BoxStream<'a, Result<TimeSeries>> {
        Box::pin(async_stream::try_stream! {
            for item in &self.items {
                match item {
                    StaticItem::Series(series) => {
                        yield series.clone();
                    },
                    StaticItem::Failure(message) => {
                        Err::<(), _>(DumpError::fetch(None, message.clone()))?;
                    },
                }
            }
        })
    }
}
