//! Handlers for process registration and lifecycle.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use trainwatch_core::error::CoreError;
use trainwatch_core::metadata::flatten_metadata;
use trainwatch_core::types::ProcessId;
use trainwatch_db::models::process::{
    CreateProcess, Process, ProcessWithMetadata, UpdateMetadata, UpdateState,
};
use trainwatch_db::repositories::{MetadataRepo, ProcessRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{decode_optional_body, AppJson, IdPath};
use crate::middleware::tenant::Tenant;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: ProcessId) -> AppError {
    AppError::Core(CoreError::not_found("Process", id))
}

/// POST /api/v1/process/new
///
/// Body keys `project`, `group` and `user_metadata` are all optional; an
/// empty body registers a bare process.
pub async fn create(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<ProcessWithMetadata>>)> {
    let input: CreateProcess = decode_optional_body(&body)?;
    let metadata = match &input.user_metadata {
        Some(raw) => flatten_metadata(raw)?,
        None => BTreeMap::new(),
    };

    let process = ProcessRepo::create(&state.pool, &tenant, &input, &metadata).await?;
    tracing::info!(%tenant, process_id = %process.id, group_id = ?process.group_id, "Process registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ProcessWithMetadata { process, metadata })),
    ))
}

/// GET /api/v1/processes
pub async fn list(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
) -> AppResult<Json<DataResponse<Vec<Process>>>> {
    let processes =
        ProcessRepo::list(&state.pool, &tenant, state.config.list_process_limit).await?;
    Ok(Json(DataResponse::new(processes)))
}

/// GET /api/v1/process/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdPath(id): IdPath<ProcessId>,
) -> AppResult<Json<DataResponse<ProcessWithMetadata>>> {
    let process = ProcessRepo::find_with_metadata(&state.pool, &tenant, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(process)))
}

/// POST /api/v1/process/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdPath(id): IdPath<ProcessId>,
) -> AppResult<StatusCode> {
    if ProcessRepo::delete(&state.pool, &tenant, id).await? {
        tracing::info!(%tenant, process_id = %id, "Process deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/process/{id}/update-metadata
pub async fn update_metadata(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdPath(id): IdPath<ProcessId>,
    AppJson(input): AppJson<UpdateMetadata>,
) -> AppResult<Json<DataResponse<ProcessWithMetadata>>> {
    let entries = flatten_metadata(&input.user_metadata)?;
    if !ProcessRepo::exists(&state.pool, &tenant, id).await? {
        return Err(not_found(id));
    }

    MetadataRepo::upsert(&state.pool, &tenant, id, &entries).await?;

    let process = ProcessRepo::find_with_metadata(&state.pool, &tenant, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(process)))
}

/// POST /api/v1/process/{id}/state
pub async fn update_state(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdPath(id): IdPath<ProcessId>,
    AppJson(input): AppJson<UpdateState>,
) -> AppResult<Json<DataResponse<Process>>> {
    let process = ProcessRepo::update_status(&state.pool, &tenant, id, input.state)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(%tenant, process_id = %id, status = %process.status, "Process state updated");
    Ok(Json(DataResponse::new(process)))
}
