//! Average/max/min statistics over a set of readings.
//!
//! [`summarize`] produces one canonical [`AggregateReport`]; the nested and
//! legacy flat shapes served to clients are both rendered from it, so the two
//! can never disagree.

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

use crate::db::models::Reading;

/// Decimal places kept on each field's average. Maximum and minimum are
/// never rounded.
pub const TEMPERATURE_PRECISION: i32 = 1;
pub const HUMIDITY_PRECISION: i32 = 1;
pub const PH_PRECISION: i32 = 2;
pub const LIGHT_PRECISION: i32 = 0;

/// One input row. A missing field counts as `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub ph: Option<f64>,
    #[serde(default)]
    pub light: Option<f64>,
}

impl From<&Reading> for MetricSample {
    fn from(r: &Reading) -> Self {
        Self {
            temperature: Some(r.temperature),
            humidity: Some(r.humidity),
            ph: Some(r.ph),
            light: Some(r.light),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct MetricSummary {
    /// Mean, rounded to the field's precision.
    #[serde(rename = "avg")]
    pub average: f64,
    #[serde(rename = "max")]
    pub maximum: f64,
    #[serde(rename = "min")]
    pub minimum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateReport {
    pub temperature: MetricSummary,
    pub humidity: MetricSummary,
    pub ph: MetricSummary,
    pub light: MetricSummary,
}

/// Result of [`summarize`]. `Empty` is the defined outcome for no input,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Summary {
    Empty,
    Report(AggregateReport),
}

pub fn summarize(samples: &[MetricSample]) -> Summary {
    if samples.is_empty() {
        return Summary::Empty;
    }

    Summary::Report(AggregateReport {
        temperature: column(samples, |s| s.temperature, TEMPERATURE_PRECISION),
        humidity: column(samples, |s| s.humidity, HUMIDITY_PRECISION),
        ph: column(samples, |s| s.ph, PH_PRECISION),
        light: column(samples, |s| s.light, LIGHT_PRECISION),
    })
}

/// Statistics for one field. Caller guarantees `samples` is non-empty.
fn column(
    samples: &[MetricSample],
    field: impl Fn(&MetricSample) -> Option<f64>,
    precision: i32,
) -> MetricSummary {
    let mut values: Vec<f64> = samples.iter().map(|s| field(s).unwrap_or(0.0)).collect();
    // Summed in sorted order so the mean does not depend on input order.
    values.sort_by(f64::total_cmp);

    let sum: f64 = values.iter().sum();
    let mean = sum / values.len() as f64;

    MetricSummary {
        average: round_to(mean, precision),
        maximum: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        minimum: values.iter().copied().fold(f64::INFINITY, f64::min),
    }
}

/// Round to `precision` decimal places, ties to even.
pub fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round_ties_even() / factor
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Per-field `{avg, max, min}`. A `None` field renders as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct NestedMetrics {
    #[serde(serialize_with = "empty_object_if_none")]
    #[schema(value_type = MetricSummary)]
    pub temperature: Option<MetricSummary>,
    #[serde(serialize_with = "empty_object_if_none")]
    #[schema(value_type = MetricSummary)]
    pub humidity: Option<MetricSummary>,
    #[serde(serialize_with = "empty_object_if_none")]
    #[schema(value_type = MetricSummary)]
    pub ph: Option<MetricSummary>,
    #[serde(serialize_with = "empty_object_if_none")]
    #[schema(value_type = MetricSummary)]
    pub light: Option<MetricSummary>,
}

/// Flat aliases kept for older dashboard clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LegacyMetrics {
    pub avg_temp: f64,
    pub avg_humidity: f64,
    pub avg_ph: f64,
    pub max_light: f64,
    pub min_light: f64,
}

impl AggregateReport {
    pub fn nested(&self) -> NestedMetrics {
        NestedMetrics {
            temperature: Some(self.temperature),
            humidity: Some(self.humidity),
            ph: Some(self.ph),
            light: Some(self.light),
        }
    }

    pub fn legacy(&self) -> LegacyMetrics {
        LegacyMetrics {
            avg_temp: self.temperature.average,
            avg_humidity: self.humidity.average,
            avg_ph: self.ph.average,
            max_light: self.light.maximum,
            min_light: self.light.minimum,
        }
    }
}

impl Summary {
    pub fn report(&self) -> Option<&AggregateReport> {
        match self {
            Self::Empty => None,
            Self::Report(report) => Some(report),
        }
    }

    /// Nested view; every field is empty when there was no input.
    pub fn nested(&self) -> NestedMetrics {
        self.report().map(AggregateReport::nested).unwrap_or_default()
    }

    pub fn legacy(&self) -> Option<LegacyMetrics> {
        self.report().map(AggregateReport::legacy)
    }
}

/// Serialize `None` as an empty JSON object instead of `null`.
pub(crate) fn empty_object_if_none<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    match value {
        Some(inner) => inner.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
