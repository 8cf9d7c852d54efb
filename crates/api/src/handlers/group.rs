//! Handlers for process groups.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use trainwatch_core::error::CoreError;
use trainwatch_core::types::GroupId;
use trainwatch_db::models::group::{CreateGroup, Group, GroupWithProcesses};
use trainwatch_db::repositories::GroupRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{decode_optional_body, IdPath};
use crate::middleware::tenant::Tenant;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/group/new
pub async fn create(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<Group>>)> {
    let input: CreateGroup = decode_optional_body(&body)?;
    let group = GroupRepo::create(&state.pool, &tenant, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(group))))
}

/// GET /api/v1/group/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdPath(id): IdPath<GroupId>,
) -> AppResult<Json<DataResponse<GroupWithProcesses>>> {
    let group = GroupRepo::find_with_processes(&state.pool, &tenant, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Group", id)))?;
    Ok(Json(DataResponse::new(group)))
}

/// POST /api/v1/group/{id}/delete
///
/// Member processes are unlinked, not deleted.
pub async fn delete(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    IdPath(id): IdPath<GroupId>,
) -> AppResult<StatusCode> {
    if GroupRepo::delete(&state.pool, &tenant, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("Group", id)))
    }
}
