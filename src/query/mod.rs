//! `timeSeries.list` request construction.
//!
//! Requests are plain values: building one never fails and never talks to
//! the backend. Filter parts are passed through untouched; a malformed
//! metric or resource type is rejected by the backend, not here.

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use std::time::Duration;

use crate::core::{DumpError, Result};

/// Window used when the caller supplies no start time.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Closed `[start, end]` interval at whole-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Create an interval, discarding sub-second precision of both bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: start.trunc_subsecs(0),
            end: end.trunc_subsecs(0),
        }
    }

    /// The `window` ending at `now`.
    pub fn trailing(now: DateTime<Utc>, window: Duration) -> Self {
        let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        let start = now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::new(start, now)
    }

    /// Interval from unix seconds.
    pub fn from_unix(start: i64, end: i64) -> Result<Self> {
        Ok(Self::new(unix_seconds(start)?, unix_seconds(end)?))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

fn unix_seconds(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DumpError::config(format!("unix time {secs} is out of range")))
}

/// Every request asks for labels and points.
pub const FULL_VIEW: &str = "FULL";

/// A `projects.timeSeries.list` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTimeSeriesRequest {
    /// Resource name, `projects/<project>`
    pub name: String,
    /// Monitoring filter expression
    pub filter: String,
    pub interval: TimeInterval,
    pub page_size: Option<u32>,
}

impl ListTimeSeriesRequest {
    /// Request every series of `metric_type` on `resource_type` in `interval`.
    pub fn new(
        project: &str,
        metric_type: &str,
        resource_type: &str,
        interval: TimeInterval,
    ) -> Self {
        Self {
            name: format!("projects/{project}"),
            filter: build_filter(metric_type, resource_type),
            interval,
            page_size: None,
        }
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// Query parameters for one page, excluding the page token.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("filter", self.filter.clone()),
            ("interval.startTime", rfc3339(self.interval.start)),
            ("interval.endTime", rfc3339(self.interval.end)),
            ("view", FULL_VIEW.to_string()),
        ];
        if let Some(size) = self.page_size {
            params.push(("pageSize", size.to_string()));
        }
        params
    }
}

/// `metric.type="<metric>" resource.type="<resource>"`
pub fn build_filter(metric_type: &str, resource_type: &str) -> String {
    format!("metric.type=\"{metric_type}\" resource.type=\"{resource_type}\"")
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
