//! Series flattening.
//!
//! Turns one [`TimeSeries`] into the points that get printed: resource and
//! metric labels merged into a single tagged list, shared by every point of
//! the series, and exactly one typed value per point.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::core::types::LabelMap;
use crate::core::{Distribution, DumpError, Result, TimeSeries, TypedValue};

/// Which label map a [`KeyValue`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelOrigin {
    Resource,
    Metric,
}

/// A single label, tagged by origin so both maps fit in one list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct KeyValue {
    #[serde(rename = "type")]
    pub origin: LabelOrigin,
    pub key: String,
    pub value: String,
}

/// The value of an output point. Unlike [`TypedValue`] there is no
/// unrecognized case: those are rejected while flattening.
#[derive(Debug, Clone, PartialEq)]
pub enum PointValue {
    Bool(bool),
    Int64(i64),
    Double(f64),
    String(String),
    Distribution(Distribution),
}

/// One flattened sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub timestamp: DateTime<Utc>,
    /// Labels of the parent series, shared with its other points.
    pub labels: Arc<[KeyValue]>,
    pub value: PointValue,
}

/// Merge resource labels then metric labels into one tagged list.
///
/// The order inside each map is whatever the map iterates in; callers must
/// not depend on it.
pub fn merge_labels(resource: &LabelMap, metric: &LabelMap) -> Vec<KeyValue> {
    let tagged = |origin: LabelOrigin, labels: &LabelMap| {
        labels
            .iter()
            .map(move |(key, value)| KeyValue {
                origin,
                key: key.clone(),
                value: value.clone(),
            })
            .collect::<Vec<_>>()
    };

    let mut merged = tagged(LabelOrigin::Resource, resource);
    merged.extend(tagged(LabelOrigin::Metric, metric));
    merged
}

impl TryFrom<TypedValue> for PointValue {
    type Error = DumpError;

    fn try_from(value: TypedValue) -> Result<Self> {
        Ok(match value {
            TypedValue::Bool(v) => PointValue::Bool(v),
            TypedValue::Int64(v) => PointValue::Int64(v),
            TypedValue::Double(v) => PointValue::Double(v),
            TypedValue::String(v) => PointValue::String(v),
            TypedValue::Distribution(v) => PointValue::Distribution(v),
            TypedValue::Unrecognized(kind) => return Err(DumpError::UnsupportedValueType(kind)),
        })
    }
}

/// Flatten a series into its points, in backend order.
///
/// Fails on the first point whose value kind is not supported; no points of
/// the series are returned in that case.
pub fn flatten_series(series: TimeSeries) -> Result<Vec<Point>> {
    let labels: Arc<[KeyValue]> =
        merge_labels(&series.resource.labels, &series.metric.labels).into();

    series
        .points
        .into_iter()
        .map(|point| -> Result<Point> {
            Ok(Point {
                timestamp: point.interval.timestamp(),
                labels: Arc::clone(&labels),
                value: PointValue::try_from(point.value)?,
            })
        })
        .collect()
}
