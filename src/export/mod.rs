//! JSON line output.
//!
//! Each series becomes one JSON array of point objects followed by a
//! newline. Point values are encoded as five optional fields of which
//! exactly one is non-null. That encoding exists only here; the rest of
//! the crate works with [`PointValue`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

use crate::core::{BucketLayout, Distribution, DumpError, Exemplar, ExplicitBuckets, Result};
use crate::core::{ExponentialBuckets, LinearBuckets};
use crate::flatten::{KeyValue, Point, PointValue};

#[derive(Serialize)]
struct PointRecord<'a> {
    timestamp: DateTime<Utc>,
    labels: &'a [KeyValue],
    bool_value: Option<bool>,
    int64_value: Option<i64>,
    double_value: Option<f64>,
    string_value: Option<&'a str>,
    distribution_value: Option<DistributionRecord<'a>>,
}

#[derive(Serialize)]
struct DistributionRecord<'a> {
    count: i64,
    mean: f64,
    sum_of_squared_deviation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<RangeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_options: Option<BucketOptionsRecord<'a>>,
    bucket_counts: &'a [i64],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exemplars: Vec<ExemplarRecord<'a>>,
}

#[derive(Serialize)]
struct RangeRecord {
    min: f64,
    max: f64,
}

#[derive(Serialize)]
struct BucketOptionsRecord<'a> {
    options: OptionsUnion<'a>,
}

/// At most one field is set, matching the declared layout.
#[derive(Serialize, Default)]
struct OptionsUnion<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    linear_buckets: Option<LinearRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exponential_buckets: Option<ExponentialRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explicit_buckets: Option<ExplicitRecord<'a>>,
}

#[derive(Serialize)]
struct LinearRecord {
    num_finite_buckets: i32,
    width: f64,
    offset: f64,
}

#[derive(Serialize)]
struct ExponentialRecord {
    num_finite_buckets: i32,
    growth_factor: f64,
    scale: f64,
}

#[derive(Serialize)]
struct ExplicitRecord<'a> {
    bounds: &'a [f64],
}

#[derive(Serialize)]
struct ExemplarRecord<'a> {
    value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    attachments: &'a [Value],
}

/// JSON numbers cannot hold NaN or infinities.
fn finite(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DumpError::serialization(format!(
            "{field} is {value}, which has no JSON representation"
        )))
    }
}

impl<'a> PointRecord<'a> {
    fn new(point: &'a Point) -> Result<Self> {
        let mut record = PointRecord {
            timestamp: point.timestamp,
            labels: &point.labels,
            bool_value: None,
            int64_value: None,
            double_value: None,
            string_value: None,
            distribution_value: None,
        };

        match &point.value {
            PointValue::Bool(v) => record.bool_value = Some(*v),
            PointValue::Int64(v) => record.int64_value = Some(*v),
            PointValue::Double(v) => record.double_value = Some(finite("double_value", *v)?),
            PointValue::String(v) => record.string_value = Some(v.as_str()),
            PointValue::Distribution(d) => {
                record.distribution_value = Some(DistributionRecord::new(d)?);
            },
        }

        Ok(record)
    }
}

impl<'a> DistributionRecord<'a> {
    fn new(dist: &'a Distribution) -> Result<Self> {
        let range = dist
            .range
            .map(|r| -> Result<RangeRecord> {
                Ok(RangeRecord {
                    min: finite("range.min", r.min)?,
                    max: finite("range.max", r.max)?,
                })
            })
            .transpose()?;

        let bucket_options = match &dist.bucket_options {
            Some(options) => Some(BucketOptionsRecord {
                options: match &options.layout {
                    Some(layout) => OptionsUnion::new(layout)?,
                    None => OptionsUnion::default(),
                },
            }),
            None => None,
        };

        let exemplars = dist
            .exemplars
            .iter()
            .map(ExemplarRecord::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(DistributionRecord {
            count: dist.count,
            mean: finite("mean", dist.mean)?,
            sum_of_squared_deviation: finite(
                "sum_of_squared_deviation",
                dist.sum_of_squared_deviation,
            )?,
            range,
            bucket_options,
            bucket_counts: &dist.bucket_counts,
            exemplars,
        })
    }
}

impl<'a> OptionsUnion<'a> {
    fn new(layout: &'a BucketLayout) -> Result<Self> {
        Ok(match layout {
            BucketLayout::Linear(LinearBuckets { num_finite_buckets, width, offset }) => {
                OptionsUnion {
                    linear_buckets: Some(LinearRecord {
                        num_finite_buckets: *num_finite_buckets,
                        width: finite("linear_buckets.width", *width)?,
                        offset: finite("linear_buckets.offset", *offset)?,
                    }),
                    ..OptionsUnion::default()
                }
            },
            BucketLayout::Exponential(ExponentialBuckets {
                num_finite_buckets,
                growth_factor,
                scale,
            }) => OptionsUnion {
                exponential_buckets: Some(ExponentialRecord {
                    num_finite_buckets: *num_finite_buckets,
                    growth_factor: finite("exponential_buckets.growth_factor", *growth_factor)?,
                    scale: finite("exponential_buckets.scale", *scale)?,
                }),
                ..OptionsUnion::default()
            },
            BucketLayout::Explicit(ExplicitBuckets { bounds }) => {
                for bound in bounds {
                    finite("explicit_buckets.bounds", *bound)?;
                }
                OptionsUnion {
                    explicit_buckets: Some(ExplicitRecord { bounds }),
                    ..OptionsUnion::default()
                }
            },
        })
    }
}

impl<'a> ExemplarRecord<'a> {
    fn new(exemplar: &'a Exemplar) -> Result<Self> {
        Ok(ExemplarRecord {
            value: finite("exemplars.value", exemplar.value)?,
            timestamp: exemplar.timestamp,
            attachments: &exemplar.attachments,
        })
    }
}

/// Render the points of one series as a single JSON line, without the newline.
pub fn to_json_line(points: &[Point]) -> Result<String> {
    let records = points.iter().map(PointRecord::new).collect::<Result<Vec<_>>>()?;
    Ok(serde_json::to_string(&records)?)
}

/// Writes one JSON line per series.
pub struct SeriesEmitter<W: Write> {
    writer: W,
    lines: usize,
}

impl<W: Write> SeriesEmitter<W> {
    /// Create a new emitter over `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Write the points of one series and flush, so a later failure cannot
    /// lose lines that were already produced.
    pub fn emit(&mut self, points: &[Point]) -> Result<()> {
        let line = to_json_line(points)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.lines += 1;
        Ok(())
    }

    /// Number of lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Consume the emitter and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
