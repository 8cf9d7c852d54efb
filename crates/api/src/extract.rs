//! Request extractors whose rejections use the JSON error envelope.
//!
//! Axum's stock `Json` and `Path` reject with plain-text bodies; these
//! wrappers route the rejection through [`AppError`] instead.

use axum::extract::{FromRequest, FromRequestParts};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

/// `axum::Json` with an [`AppError`] rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Path` with an [`AppError`] rejection, so a malformed UUID
/// yields a 400 envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct IdPath<T>(pub T);

/// Decode a body whose keys are all optional. An empty body is the default
/// value; anything else must be valid JSON for `T`.
pub fn decode_optional_body<T>(body: &[u8]) -> AppResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("invalid body: {e}")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Body {
        name: Option<String>,
    }

    #[test]
    fn empty_body_is_default() {
        assert_eq!(decode_optional_body::<Body>(b"").unwrap(), Body::default());
        assert_eq!(decode_optional_body::<Body>(b" \n").unwrap(), Body::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert_matches!(
            decode_optional_body::<Body>(br#"{"nme": "x"}"#),
            Err(AppError::BadRequest(msg)) if msg.contains("unknown field")
        );
    }

    #[test]
    fn decodes_object() {
        let body = decode_optional_body::<Body>(br#"{"name": "sweep"}"#).unwrap();
        assert_eq!(body.name.as_deref(), Some("sweep"));
    }
}
