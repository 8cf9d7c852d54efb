//! Process entity model and DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use trainwatch_core::process_status::ProcessStatus;
use trainwatch_core::types::{GroupId, ProcessId, Timestamp};

/// A row from the `processes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Process {
    #[serde(rename = "process_uuid")]
    pub id: ProcessId,
    pub tenant_id: String,
    pub group_id: Option<GroupId>,
    pub project: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProcessStatus,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A process together with its flattened user metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessWithMetadata {
    #[serde(flatten)]
    pub process: Process,
    pub metadata: BTreeMap<String, Value>,
}

/// Body of `POST /process/new`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProcess {
    pub project: Option<String>,
    /// Name of a new group to create and link the process to.
    pub group: Option<String>,
    pub user_metadata: Option<Map<String, Value>>,
}

/// Body of `POST /process/{id}/update-metadata`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMetadata {
    pub user_metadata: Map<String, Value>,
}

/// Body of `POST /process/{id}/state`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateState {
    pub state: ProcessStatus,
}
