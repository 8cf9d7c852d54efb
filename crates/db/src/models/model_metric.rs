//! Stored model-metric points.

use sqlx::FromRow;
use trainwatch_core::model_metrics::MetricRecord;
use trainwatch_core::types::ProcessId;

/// A row from the `model_metrics` table.
///
/// `step` is stored as BIGINT so the full `u32` range fits; decoding fails
/// if a row somehow holds a value outside it.
#[derive(Debug, Clone, FromRow)]
pub struct ModelMetricRow {
    pub process_id: ProcessId,
    pub metric_name: String,
    pub step_name: String,
    #[sqlx(try_from = "i64")]
    pub step: u32,
    pub metric_value: String,
}

impl From<ModelMetricRow> for MetricRecord {
    fn from(row: ModelMetricRow) -> Self {
        MetricRecord {
            process_id: row.process_id,
            metric_name: row.metric_name,
            step_name: row.step_name,
            step: row.step,
            metric_value: row.metric_value,
        }
    }
}
