//! Common test utilities and fixtures.

#![allow(dead_code)]

use gcm_dump::core::TimeSeries;
use serde_json::{json, Value};

/// Builds series in the Monitoring API JSON encoding.
pub struct TestSeriesBuilder {
    metric_type: String,
    resource_type: String,
    resource_labels: Vec<(String, String)>,
    metric_labels: Vec<(String, String)>,
    points: Vec<Value>,
}

impl TestSeriesBuilder {
    pub fn new(metric_type: &str) -> Self {
        Self {
            metric_type: metric_type.to_string(),
            resource_type: "gce_instance".to_string(),
            resource_labels: Vec::new(),
            metric_labels: Vec::new(),
            points: Vec::new(),
        }
    }

    pub fn resource_label(mut self, key: &str, value: &str) -> Self {
        self.resource_labels.push((key.to_string(), value.to_string()));
        self
    }

    pub fn metric_label(mut self, key: &str, value: &str) -> Self {
        self.metric_labels.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a point with an explicit start and end time.
    pub fn point(mut self, start: &str, value: Value) -> Self {
        self.points.push(json!({
            "interval": {"startTime": start, "endTime": start},
            "value": value,
        }));
        self
    }

    pub fn to_json(&self) -> Value {
        let labels = |pairs: &[(String, String)]| {
            pairs
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect::<serde_json::Map<_, _>>()
        };

        json!({
            "metric": {"type": self.metric_type, "labels": labels(&self.metric_labels)},
            "resource": {"type": self.resource_type, "labels": labels(&self.resource_labels)},
            "metricKind": "GAUGE",
            "points": self.points,
        })
    }

    pub fn build(&self) -> TimeSeries {
        serde_json::from_value(self.to_json()).unwrap()
    }
}

pub const T0: &str = "2024-03-01T12:00:00Z";
pub const T1: &str = "2024-03-01T12:01:00Z";

/// The series from the end-to-end scenario: an int64 point at T0 and an
/// explicit-bucket distribution at T1.
pub fn scenario_series() -> TestSeriesBuilder {
    TestSeriesBuilder::new("custom.googleapis.com/latency")
        .resource_label("zone", "us-central1-a")
        .metric_label("instance", "i-1")
        .point(T0, json!({"int64Value": "42"}))
        .point(
            T1,
            json!({
                "distributionValue": {
                    "count": "3",
                    "mean": 1.5,
                    "bucketOptions": {"explicitBuckets": {"bounds": [0.0, 1.0]}},
                    "bucketCounts": ["1", "2", "0"]
                }
            }),
        )
}

/// Sort a JSON label list by (type, key) so comparisons ignore order.
pub fn sorted_labels(labels: &Value) -> Vec<(String, String, String)> {
    let mut out: Vec<_> = labels
        .as_array()
        .unwrap()
        .iter()
        .map(|kv| {
            (
                kv["type"].as_str().unwrap().to_string(),
                kv["key"].as_str().unwrap().to_string(),
                kv["value"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    out.sort();
    out
}

/// Parse emitted output into one JSON value per line.
pub fn parse_lines(output: &[u8]) -> Vec<Value> {
    std::str::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
