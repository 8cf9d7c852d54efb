//! Row structs and input DTOs.
//!
//! Row structs derive `FromRow` + `Serialize`; inputs decoded from request
//! bodies derive `Deserialize` and reject unknown keys.

pub mod group;
pub mod metadata;
pub mod model_metric;
pub mod process;
