//! Group entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trainwatch_core::types::{GroupId, Timestamp};

use crate::models::process::Process;

/// A row from the `groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    #[serde(rename = "group_uuid")]
    pub id: GroupId,
    pub tenant_id: String,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupWithProcesses {
    #[serde(flatten)]
    pub group: Group,
    pub processes: Vec<Process>,
}

/// Body of `POST /group/new`. Missing fields default to empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGroup {
    pub name: Option<String>,
    pub description: Option<String>,
}
