//! User metadata flattening.
//!
//! Clients attach arbitrary nested JSON (hyperparameters, repo links,
//! checkpoint paths) to a process. It is stored as one row per leaf, keyed
//! by the dot-joined path, so individual keys can be indexed and upserted.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::CoreError;

/// Maximum length of a flattened metadata key, in characters.
pub const MAX_METADATA_KEY_LEN: usize = 255;

/// Separator between nested object keys in a flattened key.
pub const KEY_SEPARATOR: char = '.';

/// Flatten a metadata object into dot-style keys.
///
/// Nested non-empty objects are descended into; every other value (scalars,
/// arrays, empty objects) is a leaf stored as-is.
///
/// ```text
/// {"optimizer": {"name": "adam", "lr": 0.001}, "tags": ["a"]}
///   -> optimizer.lr = 0.001, optimizer.name = "adam", tags = ["a"]
/// ```
pub fn flatten_metadata(
    metadata: &Map<String, Value>,
) -> Result<BTreeMap<String, Value>, CoreError> {
    let mut out = BTreeMap::new();
    flatten_into(&mut out, None, metadata)?;
    Ok(out)
}

fn flatten_into(
    out: &mut BTreeMap<String, Value>,
    prefix: Option<&str>,
    object: &Map<String, Value>,
) -> Result<(), CoreError> {
    for (key, value) in object {
        if key.is_empty() {
            return Err(CoreError::Validation(
                "metadata keys must not be empty".into(),
            ));
        }
        let path = match prefix {
            Some(prefix) => format!("{prefix}{KEY_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) if !nested.is_empty() => flatten_into(out, Some(&path), nested)?,
            leaf => {
                if path.chars().count() > MAX_METADATA_KEY_LEN {
                    return Err(CoreError::Validation(format!(
                        "metadata key exceeds {MAX_METADATA_KEY_LEN} characters: {path}"
                    )));
                }
                out.insert(path, leaf.clone());
            }
        }
    }
    Ok(())
}
