//! Process lifecycle states.
//!
//! Stored as lowercase text in `processes.status` (guarded by a CHECK
//! constraint) and reported by clients via `POST /process/{id}/state`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Running,
    Succeeded,
    Failed,
}

impl ProcessStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Succeeded => "succeeded",
            ProcessStatus::Failed => "failed",
        }
    }

    /// Terminal states stamp the process `end_time`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ProcessStatus::Running)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(ProcessStatus::Running),
            "succeeded" => Ok(ProcessStatus::Succeeded),
            "failed" => Ok(ProcessStatus::Failed),
            other => Err(CoreError::Validation(format!(
                "state must be one of: running, succeeded, failed (got {other:?})"
            ))),
        }
    }
}

impl TryFrom<String> for ProcessStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
