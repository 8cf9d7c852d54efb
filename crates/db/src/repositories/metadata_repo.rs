//! Repository for the `process_metadata` table.

use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::PgPool;
use trainwatch_core::tenant::TenantId;
use trainwatch_core::types::ProcessId;

use crate::models::metadata::ProcessMetadata;

/// Provides read and upsert operations for flattened process metadata.
pub struct MetadataRepo;

impl MetadataRepo {
    /// All metadata rows of a process, ordered by key.
    pub async fn list_for_process(
        pool: &PgPool,
        tenant: &TenantId,
        process_id: ProcessId,
    ) -> Result<Vec<ProcessMetadata>, sqlx::Error> {
        sqlx::query_as::<_, ProcessMetadata>(
            "SELECT process_id, key, value, updated_at FROM process_metadata \
             WHERE process_id = $1 AND tenant_id = $2 \
             ORDER BY key",
        )
        .bind(process_id)
        .bind(tenant.as_str())
        .fetch_all(pool)
        .await
    }

    /// Metadata of a process as a `key -> value` map.
    pub async fn map_for_process(
        pool: &PgPool,
        tenant: &TenantId,
        process_id: ProcessId,
    ) -> Result<BTreeMap<String, Value>, sqlx::Error> {
        let rows = Self::list_for_process(pool, tenant, process_id).await?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }

    /// Insert or overwrite flattened keys in one transaction.
    ///
    /// Keys not present in `entries` are left untouched. Returns the number
    /// of keys written.
    pub async fn upsert(
        pool: &PgPool,
        tenant: &TenantId,
        process_id: ProcessId,
        entries: &BTreeMap<String, Value>,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let written = Self::upsert_inner(&mut tx, tenant, process_id, entries).await?;
        tx.commit().await?;
        Ok(written)
    }

    pub(crate) async fn upsert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant: &TenantId,
        process_id: ProcessId,
        entries: &BTreeMap<String, Value>,
    ) -> Result<u64, sqlx::Error> {
        let mut written = 0;
        for (key, value) in entries {
            let result = sqlx::query(
                "INSERT INTO process_metadata (tenant_id, process_id, key, value) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT ON CONSTRAINT uq_process_metadata_key \
                 DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
            )
            .bind(tenant.as_str())
            .bind(process_id)
            .bind(key)
            .bind(value)
            .execute(&mut **tx)
            .await?;
            written += result.rows_affected();
        }
        Ok(written)
    }
}
