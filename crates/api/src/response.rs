//! Shared response envelope types for API handlers.
//!
//! Successful responses use `{ "status": "success", "data": ... }`; errors
//! carry `"status": "error"` (see [`crate::error::AppError`]).

use serde::Serialize;

/// Standard `{ "status": "success", "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse::new(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}
