//! Handlers for model-metric ingestion and chart queries.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use trainwatch_core::error::CoreError;
use trainwatch_core::model_metrics::{
    build_panels, dense_join, is_panel_ordered, parse_batch, MetricRecord, ModelMetricsView,
};
use trainwatch_core::tenant::TenantId;
use trainwatch_core::types::ProcessId;
use trainwatch_db::repositories::{ModelMetricRepo, ProcessRepo};
use trainwatch_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, IdPath};
use crate::middleware::tenant::Tenant;
use crate::response::DataResponse;
use crate::state::AppState;

const POINT_CONSTRAINT: &str = "uq_model_metrics_point";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub message: &'static str,
    pub metrics_created: u64,
}

/// POST /api/v1/process/{id}/model-metrics
///
/// The body is validated in full before the process lookup and the write,
/// so a rejected batch never touches the database.
pub async fn ingest(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdPath(process_id): IdPath<ProcessId>,
    body: Bytes,
) -> AppResult<Json<DataResponse<IngestSummary>>> {
    let batch = parse_batch(&body, state.config.step_policy())?;
    ensure_process(&state.pool, &tenant, process_id).await?;

    let created = ModelMetricRepo::insert_batch(&state.pool, &tenant, process_id, &batch)
        .await
        .map_err(duplicate_point_conflict)?;

    tracing::info!(%tenant, %process_id, created, "Model metrics ingested");

    Ok(Json(DataResponse::new(IngestSummary {
        message: "Metrics successfully added",
        metrics_created: created,
    })))
}

/// GET /api/v1/process/{id}/model-metrics
pub async fn get_for_process(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdPath(process_id): IdPath<ProcessId>,
) -> AppResult<Json<DataResponse<ModelMetricsView>>> {
    ensure_process(&state.pool, &tenant, process_id).await?;
    let view = load_view(&state.pool, &tenant, &[process_id]).await?;
    Ok(Json(DataResponse::new(view)))
}

/// POST /api/v1/processes/model-metrics
///
/// Body: JSON array of process ids. Ids the tenant does not own contribute
/// nothing to the result.
pub async fn query(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    AppJson(process_ids): AppJson<Vec<ProcessId>>,
) -> AppResult<Json<DataResponse<ModelMetricsView>>> {
    let view = load_view(&state.pool, &tenant, &process_ids).await?;
    Ok(Json(DataResponse::new(view)))
}

async fn ensure_process(pool: &DbPool, tenant: &TenantId, process_id: ProcessId) -> AppResult<()> {
    if ProcessRepo::exists(pool, tenant, process_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::not_found("Process", process_id)))
    }
}

async fn load_view(
    pool: &DbPool,
    tenant: &TenantId,
    process_ids: &[ProcessId],
) -> AppResult<ModelMetricsView> {
    if process_ids.is_empty() {
        return Ok(ModelMetricsView::default());
    }

    let records: Vec<MetricRecord> = ModelMetricRepo::list_for_processes(pool, tenant, process_ids)
        .await?
        .into_iter()
        .map(MetricRecord::from)
        .collect();

    let rows = dense_join(records, process_ids);
    debug_assert!(is_panel_ordered(&rows));
    Ok(build_panels(&rows))
}

/// Turn a unique-key collision with an already stored point into a
/// domain conflict; other failures pass through unchanged.
fn duplicate_point_conflict(err: sqlx::Error) -> AppError {
    let is_duplicate = err
        .as_database_error()
        .is_some_and(|db_err| db_err.constraint() == Some(POINT_CONSTRAINT));

    if is_duplicate {
        AppError::Core(CoreError::Conflict(
            "a point with the same metric name, step name and step already exists".into(),
        ))
    } else {
        AppError::Database(err)
    }
}
