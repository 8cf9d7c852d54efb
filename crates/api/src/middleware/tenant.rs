//! Tenant resolution extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use trainwatch_core::error::CoreError;
use trainwatch_core::tenant::TenantId;

use crate::error::AppError;
use crate::state::AppState;

/// Header set by the upstream auth proxy.
pub const TENANT_HEADER: &str = "x-scope-orgid";

/// The tenant a request acts on.
///
/// Resolution order:
///
/// 1. `CONST_TENANT` from configuration, when set;
/// 2. the `X-Scope-OrgID` header;
/// 3. `Authorization: Bearer <tenant>:<token>`.
///
/// The token half of the bearer value is verified upstream, not here.
#[derive(Debug, Clone)]
pub struct Tenant(pub TenantId);

impl FromRequestParts<AppState> for Tenant {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(tenant) = &state.config.const_tenant {
            return Ok(Tenant(tenant.clone()));
        }

        let raw = tenant_from_headers(&parts.headers)?;
        Ok(Tenant(TenantId::parse(raw)?))
    }
}

fn tenant_from_headers(headers: &HeaderMap) -> Result<&str, AppError> {
    if let Some(value) = headers.get(TENANT_HEADER) {
        let raw = value.to_str().map_err(|_| {
            AppError::Core(CoreError::BadRequest(
                "X-Scope-OrgID must be visible ASCII".into(),
            ))
        })?;
        if raw.is_empty() {
            return Err(missing());
        }
        return Ok(raw);
    }

    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(missing)?;

    auth_header
        .strip_prefix("Bearer ")
        .and_then(|credentials| credentials.split_once(':'))
        .map(|(tenant, _token)| tenant)
        .filter(|tenant| !tenant.is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <tenant>:<token>".into(),
            ))
        })
}

fn missing() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Missing tenant: set X-Scope-OrgID or Authorization".into(),
    ))
}
