//! Flattened process metadata rows.

use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use trainwatch_core::types::{ProcessId, Timestamp};

/// A row from the `process_metadata` table: one flattened key.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProcessMetadata {
    pub process_id: ProcessId,
    pub key: String,
    pub value: Value,
    pub updated_at: Timestamp,
}
