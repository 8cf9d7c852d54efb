//! Repository for the `processes` table.

use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::PgPool;
use trainwatch_core::process_status::ProcessStatus;
use trainwatch_core::tenant::TenantId;
use trainwatch_core::types::{GroupId, ProcessId};
use uuid::Uuid;

use crate::models::group::CreateGroup;
use crate::models::process::{CreateProcess, Process, ProcessWithMetadata};
use crate::repositories::{GroupRepo, MetadataRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, tenant_id, group_id, project, status, \
    start_time, end_time, created_at, updated_at";

/// Provides CRUD operations for processes.
pub struct ProcessRepo;

impl ProcessRepo {
    /// Register a new process in the `running` state.
    ///
    /// The optional group and the already-flattened metadata are written in
    /// the same transaction as the process row.
    pub async fn create(
        pool: &PgPool,
        tenant: &TenantId,
        input: &CreateProcess,
        metadata: &BTreeMap<String, Value>,
    ) -> Result<Process, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let group_id = match &input.group {
            Some(name) => {
                let group = CreateGroup {
                    name: Some(name.clone()),
                    description: None,
                };
                Some(GroupRepo::create_inner(&mut tx, tenant, &group).await?.id)
            }
            None => None,
        };

        let query = format!(
            "INSERT INTO processes (id, tenant_id, group_id, project, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let process = sqlx::query_as::<_, Process>(&query)
            .bind(Uuid::new_v4())
            .bind(tenant.as_str())
            .bind(group_id)
            .bind(&input.project)
            .bind(ProcessStatus::Running.as_str())
            .fetch_one(&mut *tx)
            .await?;

        MetadataRepo::upsert_inner(&mut tx, tenant, process.id, metadata).await?;

        tx.commit().await?;
        Ok(process)
    }

    /// Find a process by id within the tenant.
    pub async fn find_by_id(
        pool: &PgPool,
        tenant: &TenantId,
        id: ProcessId,
    ) -> Result<Option<Process>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM processes WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, Process>(&query)
            .bind(id)
            .bind(tenant.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Find a process by id, enriched with its flattened metadata.
    pub async fn find_with_metadata(
        pool: &PgPool,
        tenant: &TenantId,
        id: ProcessId,
    ) -> Result<Option<ProcessWithMetadata>, sqlx::Error> {
        let Some(process) = Self::find_by_id(pool, tenant, id).await? else {
            return Ok(None);
        };
        let metadata = MetadataRepo::map_for_process(pool, tenant, id).await?;
        Ok(Some(ProcessWithMetadata { process, metadata }))
    }

    /// Whether the tenant owns a process with this id.
    pub async fn exists(
        pool: &PgPool,
        tenant: &TenantId,
        id: ProcessId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM processes WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(id)
        .bind(tenant.as_str())
        .fetch_one(pool)
        .await
    }

    /// List the tenant's processes, most recently created first.
    pub async fn list(
        pool: &PgPool,
        tenant: &TenantId,
        limit: i64,
    ) -> Result<Vec<Process>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM processes WHERE tenant_id = $1 \
             ORDER BY created_at DESC, id \
             LIMIT $2"
        );
        sqlx::query_as::<_, Process>(&query)
            .bind(tenant.as_str())
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List the processes linked to a group, oldest first.
    pub async fn list_by_group(
        pool: &PgPool,
        tenant: &TenantId,
        group_id: GroupId,
    ) -> Result<Vec<Process>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM processes WHERE group_id = $1 AND tenant_id = $2 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Process>(&query)
            .bind(group_id)
            .bind(tenant.as_str())
            .fetch_all(pool)
            .await
    }

    /// Set the lifecycle state. Terminal states stamp `end_time`; moving back
    /// to `running` clears it.
    ///
    /// Returns `None` if the tenant has no such process.
    pub async fn update_status(
        pool: &PgPool,
        tenant: &TenantId,
        id: ProcessId,
        status: ProcessStatus,
    ) -> Result<Option<Process>, sqlx::Error> {
        let query = format!(
            "UPDATE processes SET \
                status = $3, \
                end_time = CASE WHEN $4 THEN NOW() ELSE NULL END, \
                updated_at = NOW() \
             WHERE id = $1 AND tenant_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Process>(&query)
            .bind(id)
            .bind(tenant.as_str())
            .bind(status.as_str())
            .bind(status.is_terminal())
            .fetch_optional(pool)
            .await
    }

    /// Delete a process. Metadata and model metrics cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, tenant: &TenantId, id: ProcessId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM processes WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
