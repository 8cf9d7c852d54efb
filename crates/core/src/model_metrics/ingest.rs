//! Decoding and validation of model-metric ingestion batches.
//!
//! A batch is a JSON array. Each element takes one of two shapes, chosen by
//! which payload key it carries:
//!
//! ```text
//! step entry:  {"step_name": "epoch", "step": 3, "metrics": {"loss": 0.41, "acc": "0.87"}}
//! series:      {"metric_name": "loss", "step_name": "epoch", "points": [{"step": 3, "value": 0.41}]}
//! ```
//!
//! `step_value` is accepted as an alias of `step` in step entries. Unknown
//! keys, mixed shapes and non-numeric values fail the whole batch; nothing is
//! persisted unless every entry is valid.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::Validate;

use crate::error::CoreError;

/// Maximum metric and step name length, in characters.
pub const MAX_NAME_LEN: usize = 32;

/// Maximum length of a metric value literal (matches the column width).
pub const MAX_VALUE_LEN: usize = 64;

/// Policy for step coordinates.
///
/// Step 0 is rejected by default; deployments whose training loops start
/// counting at zero enable `allow_zero_step`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepPolicy {
    pub allow_zero_step: bool,
}

impl StepPolicy {
    fn check(self, step: u32) -> Result<(), String> {
        if step == 0 && !self.allow_zero_step {
            return Err("step must be a positive number".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Metric values
// ---------------------------------------------------------------------------

/// A metric value kept verbatim as the client formatted it.
///
/// Guaranteed to be a JSON numeric literal such as `3`, `-0.25` or `1e-4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricValue(String);

impl MetricValue {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        check_numeric_literal(raw).map_err(CoreError::BadRequest)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn check_numeric_literal(raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        return Err("metric value cannot be empty".into());
    }
    if raw.len() > MAX_VALUE_LEN {
        return Err(format!(
            "metric value must be at most {MAX_VALUE_LEN} characters"
        ));
    }
    // serde_json tolerates surrounding whitespace; a stored value must not.
    if raw.trim() != raw || serde_json::from_str::<serde_json::Number>(raw).is_err() {
        return Err(format!("invalid numeric value {raw:?}"));
    }
    Ok(())
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match Value::deserialize(deserializer)? {
            Value::Number(number) => number.to_string(),
            Value::String(text) => text,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "metric value must be a number, got {other}"
                )))
            }
        };
        check_numeric_literal(&raw).map_err(serde::de::Error::custom)?;
        Ok(Self(raw))
    }
}

// ---------------------------------------------------------------------------
// Validated batch
// ---------------------------------------------------------------------------

/// One (step, value) coordinate of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricPoint {
    pub step: u32,
    pub value: MetricValue,
}

/// All points of one metric under one step name.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct MetricSeries {
    #[validate(length(
        min = 1,
        max = 32,
        message = "metric name must be between 1 and 32 characters"
    ))]
    pub metric_name: String,
    #[validate(length(
        min = 1,
        max = 32,
        message = "step name must be between 1 and 32 characters"
    ))]
    pub step_name: String,
    pub points: Vec<MetricPoint>,
}

/// A fully validated ingestion batch, normalised to series form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricBatch {
    series: Vec<MetricSeries>,
}

impl MetricBatch {
    pub fn series(&self) -> &[MetricSeries] {
        &self.series
    }

    /// Number of rows the batch will create.
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }
}

/// Decode and validate a raw request body.
///
/// Returns `BadRequest` for malformed JSON or an unrecognised entry shape and
/// `Validation` for rule violations. The first failing entry aborts the batch.
pub fn parse_batch(body: &[u8], policy: StepPolicy) -> Result<MetricBatch, CoreError> {
    let entries: Vec<Value> = serde_json::from_slice(body)
        .map_err(|e| CoreError::BadRequest(format!("invalid JSON: {e}")))?;

    let mut series = Vec::new();
    let mut seen = HashSet::new();
    for (index, raw) in entries.into_iter().enumerate() {
        for entry_series in BatchEntry::decode(index, raw)?.into_series() {
            validate_series(index, &entry_series, policy, &mut seen)?;
            series.push(entry_series);
        }
    }

    Ok(MetricBatch { series })
}

fn validate_series(
    index: usize,
    series: &MetricSeries,
    policy: StepPolicy,
    seen: &mut HashSet<(String, String, u32)>,
) -> Result<(), CoreError> {
    series
        .validate()
        .map_err(|e| CoreError::Validation(format!("entry {index}: {e}")))?;

    for point in &series.points {
        policy
            .check(point.step)
            .map_err(|msg| CoreError::Validation(format!("entry {index}: {msg}")))?;

        let key = (series.metric_name.clone(), series.step_name.clone(), point.step);
        if !seen.insert(key) {
            return Err(CoreError::Validation(format!(
                "entry {index}: duplicate point for metric {:?} at {} {}",
                series.metric_name, series.step_name, point.step
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepEntry {
    step_name: String,
    #[serde(alias = "step_value")]
    step: u32,
    metrics: BTreeMap<String, MetricValue>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeriesEntry {
    metric_name: String,
    step_name: String,
    points: Vec<PointEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PointEntry {
    step: u32,
    value: MetricValue,
}

enum BatchEntry {
    Steps(StepEntry),
    Series(SeriesEntry),
}

impl BatchEntry {
    /// Pick the entry shape from its payload key, then decode strictly.
    fn decode(index: usize, raw: Value) -> Result<Self, CoreError> {
        let shape_error = |msg: &str| CoreError::BadRequest(format!("entry {index}: {msg}"));

        let Value::Object(object) = &raw else {
            return Err(shape_error("expected a JSON object"));
        };

        let decoded = match (object.contains_key("metrics"), object.contains_key("points")) {
            (true, false) => serde_json::from_value(raw).map(BatchEntry::Steps),
            (false, true) => serde_json::from_value(raw).map(BatchEntry::Series),
            (true, true) => {
                return Err(shape_error("`metrics` and `points` are mutually exclusive"))
            }
            (false, false) => return Err(shape_error("expected either `metrics` or `points`")),
        };
        decoded.map_err(|e| shape_error(&e.to_string()))
    }

    fn into_series(self) -> Vec<MetricSeries> {
        match self {
            BatchEntry::Steps(entry) => entry
                .metrics
                .into_iter()
                .map(|(metric_name, value)| MetricSeries {
                    metric_name,
                    step_name: entry.step_name.clone(),
                    points: vec![MetricPoint {
                        step: entry.step,
                        value,
                    }],
                })
                .collect(),
            BatchEntry::Series(entry) => vec![MetricSeries {
                metric_name: entry.metric_name,
                step_name: entry.step_name,
                points: entry
                    .points
                    .into_iter()
                    .map(|p| MetricPoint {
                        step: p.step,
                        value: p.value,
                    })
                    .collect(),
            }],
        }
    }
}
