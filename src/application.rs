//! Fetch, flatten and emit, one series at a time.

use futures::StreamExt;
use std::future::Future;
use std::io::Write;
use std::time::Duration;

use crate::core::{DumpError, Result};
use crate::export::SeriesEmitter;
use crate::fetch::TimeSeriesSource;
use crate::flatten::flatten_series;
use crate::query::ListTimeSeriesRequest;

/// Totals for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpSummary {
    pub series: usize,
    pub points: usize,
}

/// Print every series `source` returns for `request`.
///
/// The first error stops the run. Lines written before it stay written.
pub async fn dump_time_series<S, W>(
    source: &S,
    request: &ListTimeSeriesRequest,
    emitter: &mut SeriesEmitter<W>,
) -> Result<DumpSummary>
where
    S: TimeSeriesSource + ?Sized,
    W: Write,
{
    tracing::info!(name = %request.name, filter = %request.filter, "Listing time series");

    let mut summary = DumpSummary::default();
    let mut series_stream = source.list_time_series(request);

    while let Some(series) = series_stream.next().await {
        let series = series?;
        let metric_type = series.metric.metric_type.clone();

        let points = flatten_series(series)?;
        emitter.emit(&points)?;

        summary.series += 1;
        summary.points += points.len();
        tracing::debug!(metric = %metric_type, points = points.len(), "Emitted series");
    }

    tracing::info!(series = summary.series, points = summary.points, "Done");
    Ok(summary)
}

/// Bound `run` by `deadline`, if there is one.
pub async fn run_with_deadline<F, T>(deadline: Option<Duration>, run: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| DumpError::Timeout {
            timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        })?,
        None => run.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeSeries;
    use crate::fetch::StaticSource;
    use crate::query::TimeInterval;
    use serde_json::json;

    fn request() -> ListTimeSeriesRequest {
        ListTimeSeriesRequest::new("p", "m", "r", TimeInterval::from_unix(0, 600).unwrap())
    }

    fn series(value: serde_json::Value) -> TimeSeries {
        serde_json::from_value(json!({
            "metric": {"type": "m", "labels": {"instance": "i-1"}},
            "resource": {"type": "r"},
            "points": [{"interval": {"endTime": "2024-01-01T00:00:00Z"}, "value": value}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_one_line_per_series() {
        let source = StaticSource::new(vec![
            series(json!({"int64Value": "1"})),
            series(json!({"boolValue": true})),
        ]);
        let mut emitter = SeriesEmitter::new(Vec::new());

        let summary = dump_time_series(&source, &request(), &mut emitter).await.unwrap();

        assert_eq!(summary, DumpSummary { series: 2, points: 2 });
        let output = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_value_keeps_earlier_lines() {
        let source = StaticSource::new(vec![
            series(json!({"doubleValue": 1.5})),
            series(json!({"moneyValue": {}})),
            series(json!({"doubleValue": 2.5})),
        ]);
        let mut emitter = SeriesEmitter::new(Vec::new());

        let err = dump_time_series(&source, &request(), &mut emitter).await.unwrap_err();

        assert!(matches!(err, DumpError::UnsupportedValueType(ref kind) if kind == "moneyValue"));
        assert_eq!(emitter.lines(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_run() {
        let source = StaticSource::new(vec![series(json!({"stringValue": "a"}))])
            .then_fail("backend unavailable");
        let mut emitter = SeriesEmitter::new(Vec::new());

        let err = dump_time_series(&source, &request(), &mut emitter).await.unwrap_err();

        assert_eq!(err.category(), "fetch");
        assert_eq!(emitter.lines(), 1);
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let result = run_with_deadline(Some(Duration::from_millis(10)), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(DumpError::Timeout { timeout_ms: 10 })));
    }

    #[tokio::test]
    async fn test_no_deadline_runs_to_completion() {
        let value = run_with_deadline(None, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }
}
