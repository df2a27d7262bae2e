//! Source-side time series model.
//!
//! These types mirror the Cloud Monitoring v3 JSON encoding of
//! `TimeSeries` closely enough to deserialize a `timeSeries.list` page
//! directly. int64 fields use the proto3 JSON string form on the wire
//! (`"42"`), so every integer field goes through [`json_num`].

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Label map as returned by the backend. Ordering carries no meaning.
pub type LabelMap = BTreeMap<String, String>;

/// One labeled series with its points, in the order the backend returned them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub resource: MonitoredResource,
    #[serde(default)]
    pub metric_kind: Option<String>,
    #[serde(default)]
    pub value_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub points: Vec<SourcePoint>,
}

/// Metric descriptor reference plus its labels.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Metric {
    #[serde(rename = "type", default)]
    pub metric_type: String,
    #[serde(default)]
    pub labels: LabelMap,
}

/// Monitored resource reference plus its labels.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MonitoredResource {
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default)]
    pub labels: LabelMap,
}

/// A single sample.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourcePoint {
    pub interval: PointInterval,
    pub value: TypedValue,
}

/// Sample interval. Gauge points omit the start time.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointInterval {
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: DateTime<Utc>,
}

impl PointInterval {
    /// The instant a point is reported at: its start, or its end when the
    /// backend leaves the start out.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.start_time.unwrap_or(self.end_time)
    }
}

/// Typed point value. Exactly one kind per value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Bool(bool),
    Int64(i64),
    Double(f64),
    String(String),
    Distribution(Distribution),
    /// A value kind this program does not understand, by its wire name.
    Unrecognized(String),
}

impl TypedValue {
    /// Wire name of the value kind.
    pub fn kind(&self) -> &str {
        match self {
            TypedValue::Bool(_) => "boolValue",
            TypedValue::Int64(_) => "int64Value",
            TypedValue::Double(_) => "doubleValue",
            TypedValue::String(_) => "stringValue",
            TypedValue::Distribution(_) => "distributionValue",
            TypedValue::Unrecognized(kind) => kind,
        }
    }
}

impl<'de> Deserialize<'de> for TypedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;

        // The oneof is encoded as a single-key object; an empty object means
        // the value was never set.
        let Some((kind, raw)) = fields.into_iter().next() else {
            return Ok(TypedValue::Unrecognized("<none>".to_string()));
        };

        let value = match kind.as_str() {
            "boolValue" => TypedValue::Bool(bool::deserialize(raw).map_err(de::Error::custom)?),
            "int64Value" => {
                TypedValue::Int64(json_num::i64_from_value(&raw).map_err(de::Error::custom)?)
            },
            "doubleValue" => {
                TypedValue::Double(json_num::f64_from_value(&raw).map_err(de::Error::custom)?)
            },
            "stringValue" => {
                TypedValue::String(String::deserialize(raw).map_err(de::Error::custom)?)
            },
            "distributionValue" => {
                TypedValue::Distribution(Distribution::deserialize(raw).map_err(de::Error::custom)?)
            },
            _ => TypedValue::Unrecognized(kind),
        };
        Ok(value)
    }
}

/// Histogram-style summary of a population of values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    #[serde(default, deserialize_with = "json_num::de_i64")]
    pub count: i64,
    #[serde(default, deserialize_with = "json_num::de_f64")]
    pub mean: f64,
    #[serde(default, deserialize_with = "json_num::de_f64")]
    pub sum_of_squared_deviation: f64,
    #[serde(default)]
    pub range: Option<Range>,
    #[serde(default)]
    pub bucket_options: Option<BucketOptions>,
    #[serde(default, deserialize_with = "json_num::de_i64_seq")]
    pub bucket_counts: Vec<i64>,
    #[serde(default)]
    pub exemplars: Vec<Exemplar>,
}

/// A sample recorded with a distribution, usually pointing at a trace.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Exemplar {
    #[serde(default, deserialize_with = "json_num::de_f64")]
    pub value: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// `google.protobuf.Any` messages, kept as the backend encoded them.
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
}

/// Observed minimum and maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Range {
    #[serde(default, deserialize_with = "json_num::de_f64")]
    pub min: f64,
    #[serde(default, deserialize_with = "json_num::de_f64")]
    pub max: f64,
}

/// Bucket layout of a distribution. `layout` is `None` when the backend sent
/// an options object that declares none of the known layouts.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawBucketOptions")]
pub struct BucketOptions {
    pub layout: Option<BucketLayout>,
}

/// The mutually exclusive bucket layouts.
#[derive(Debug, Clone, PartialEq)]
pub enum BucketLayout {
    Linear(LinearBuckets),
    Exponential(ExponentialBuckets),
    Explicit(ExplicitBuckets),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearBuckets {
    #[serde(default)]
    pub num_finite_buckets: i32,
    #[serde(default, deserialize_with = "json_num::de_f64")]
    pub width: f64,
    #[serde(default, deserialize_with = "json_num::de_f64")]
    pub offset: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExponentialBuckets {
    #[serde(default)]
    pub num_finite_buckets: i32,
    #[serde(default, deserialize_with = "json_num::de_f64")]
    pub growth_factor: f64,
    #[serde(default, deserialize_with = "json_num::de_f64")]
    pub scale: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExplicitBuckets {
    #[serde(default, deserialize_with = "json_num::de_f64_seq")]
    pub bounds: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBucketOptions {
    #[serde(default)]
    linear_buckets: Option<LinearBuckets>,
    #[serde(default)]
    exponential_buckets: Option<ExponentialBuckets>,
    #[serde(default)]
    explicit_buckets: Option<ExplicitBuckets>,
}

impl From<RawBucketOptions> for BucketOptions {
    fn from(raw: RawBucketOptions) -> Self {
        let layout = raw
            .linear_buckets
            .map(BucketLayout::Linear)
            .or_else(|| raw.exponential_buckets.map(BucketLayout::Exponential))
            .or_else(|| raw.explicit_buckets.map(BucketLayout::Explicit));
        BucketOptions { layout }
    }
}

/// Lenient number decoding for the proto3 JSON mapping.
pub mod json_num {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// int64 as a JSON string or number.
    pub fn i64_from_value(value: &Value) -> Result<i64, String> {
        match value {
            Value::String(s) => s.parse().map_err(|e| format!("invalid int64 {s:?}: {e}")),
            Value::Number(n) => n.as_i64().ok_or_else(|| format!("invalid int64 {n}")),
            other => Err(format!("expected int64, got {other}")),
        }
    }

    /// double as a JSON number or one of the special string forms.
    pub fn f64_from_value(value: &Value) -> Result<f64, String> {
        match value {
            Value::Number(n) => n.as_f64().ok_or_else(|| format!("invalid double {n}")),
            Value::String(s) => match s.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                _ => s.parse().map_err(|e| format!("invalid double {s:?}: {e}")),
            },
            other => Err(format!("expected double, got {other}")),
        }
    }

    pub fn de_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        i64_from_value(&value).map_err(serde::de::Error::custom)
    }

    pub fn de_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        f64_from_value(&value).map_err(serde::de::Error::custom)
    }

    pub fn de_f64_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Value>::deserialize(deserializer)?;
        values
            .iter()
            .map(|v| f64_from_value(v).map_err(serde::de::Error::custom))
            .collect()
    }

    pub fn de_i64_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
        let values = Vec::<Value>::deserialize(deserializer)?;
        values
            .iter()
            .map(|v| i64_from_value(v).map_err(serde::de::Error::custom))
            .collect()
    }
}
