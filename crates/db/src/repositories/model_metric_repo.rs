//! Repository for the `model_metrics` table.
//!
//! Points are append-only: a batch is written in one transaction or not at
//! all, and rows only disappear through the process cascade.

use sqlx::PgPool;
use trainwatch_core::model_metrics::MetricBatch;
use trainwatch_core::tenant::TenantId;
use trainwatch_core::types::ProcessId;

use crate::models::model_metric::ModelMetricRow;

const COLUMNS: &str = "process_id, metric_name, step_name, step, metric_value";

/// Provides batch insert and query operations for model metrics.
pub struct ModelMetricRepo;

impl ModelMetricRepo {
    /// Persist every point of a validated batch atomically.
    ///
    /// Any failing insert (for instance a point whose key already exists,
    /// which violates `uq_model_metrics_point`) rolls the whole batch back and
    /// is returned unchanged. Returns the number of rows created.
    pub async fn insert_batch(
        pool: &PgPool,
        tenant: &TenantId,
        process_id: ProcessId,
        batch: &MetricBatch,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        match Self::insert_points(&mut tx, tenant, process_id, batch).await {
            Ok(created) => {
                tx.commit().await?;
                Ok(created)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        %process_id,
                        error = %rollback_err,
                        "Failed to roll back model-metric batch"
                    );
                }
                Err(err)
            }
        }
    }

    async fn insert_points(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant: &TenantId,
        process_id: ProcessId,
        batch: &MetricBatch,
    ) -> Result<u64, sqlx::Error> {
        let mut created = 0;
        for series in batch.series() {
            for point in &series.points {
                let result = sqlx::query(
                    "INSERT INTO model_metrics \
                        (tenant_id, process_id, metric_name, step_name, step, metric_value) \
                     VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(tenant.as_str())
                .bind(process_id)
                .bind(&series.metric_name)
                .bind(&series.step_name)
                .bind(i64::from(point.step))
                .bind(point.value.as_str())
                .execute(&mut **tx)
                .await?;
                created += result.rows_affected();
            }
        }
        Ok(created)
    }

    /// Fetch the raw points of the given processes, ordered by
    /// `(metric_name, step_name, step)`.
    pub async fn list_for_processes(
        pool: &PgPool,
        tenant: &TenantId,
        process_ids: &[ProcessId],
    ) -> Result<Vec<ModelMetricRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM model_metrics \
             WHERE tenant_id = $1 AND process_id = ANY($2) \
             ORDER BY metric_name, step_name, step"
        );
        sqlx::query_as::<_, ModelMetricRow>(&query)
            .bind(tenant.as_str())
            .bind(process_ids)
            .fetch_all(pool)
            .await
    }
}
