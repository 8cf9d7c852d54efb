//! Repository for the `groups` table.

use sqlx::PgPool;
use trainwatch_core::tenant::TenantId;
use trainwatch_core::types::GroupId;
use uuid::Uuid;

use crate::models::group::{CreateGroup, Group, GroupWithProcesses};
use crate::repositories::ProcessRepo;

const COLUMNS: &str = "id, tenant_id, name, description, created_at";

/// Provides create/read/delete operations for groups.
pub struct GroupRepo;

impl GroupRepo {
    pub async fn create(
        pool: &PgPool,
        tenant: &TenantId,
        input: &CreateGroup,
    ) -> Result<Group, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let group = Self::create_inner(&mut tx, tenant, input).await?;
        tx.commit().await?;
        Ok(group)
    }

    /// Insert a group inside an existing transaction.
    pub(crate) async fn create_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant: &TenantId,
        input: &CreateGroup,
    ) -> Result<Group, sqlx::Error> {
        let query = format!(
            "INSERT INTO groups (id, tenant_id, name, description) \
             VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, '')) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(Uuid::new_v4())
            .bind(tenant.as_str())
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant: &TenantId,
        id: GroupId,
    ) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE id = $1 AND tenant_id = $2");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .bind(tenant.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Find a group by id, enriched with its member processes.
    pub async fn find_with_processes(
        pool: &PgPool,
        tenant: &TenantId,
        id: GroupId,
    ) -> Result<Option<GroupWithProcesses>, sqlx::Error> {
        match Self::find_by_id(pool, tenant, id).await? {
            Some(group) => {
                let processes = ProcessRepo::list_by_group(pool, tenant, group.id).await?;
                Ok(Some(GroupWithProcesses { group, processes }))
            }
            None => Ok(None),
        }
    }

    /// Delete a group. Member processes survive with `group_id` cleared.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, tenant: &TenantId, id: GroupId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant.as_str())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
