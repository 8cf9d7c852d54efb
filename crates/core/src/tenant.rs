//! Tenant identifiers.
//!
//! Every row in the service is scoped by a tenant id resolved upstream (an
//! auth proxy header or a fixed development tenant). The id is opaque to the
//! service but restricted to a conservative character set so it can be
//! logged and stored without escaping.

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;

/// Maximum accepted tenant id length, in characters.
pub const MAX_TENANT_ID_LEN: usize = 64;

/// A validated tenant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Parse a raw tenant id.
    ///
    /// Accepts 1 to [`MAX_TENANT_ID_LEN`] characters from `[A-Za-z0-9_.-]`.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.is_empty() {
            return Err(CoreError::BadRequest("tenant id is empty".into()));
        }
        if raw.len() > MAX_TENANT_ID_LEN {
            return Err(CoreError::BadRequest(format!(
                "tenant id must be at most {MAX_TENANT_ID_LEN} characters"
            )));
        }
        if let Some(c) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
        {
            return Err(CoreError::BadRequest(format!(
                "tenant id contains invalid character {c:?}"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
