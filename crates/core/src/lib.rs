//! Domain logic for the training-run tracking service.
//!
//! Everything in this crate is pure: payload decoding and validation, the
//! dense metric joiner, the panel transformer, and metadata flattening. The
//! `db` and `api` crates supply the I/O around it.

pub mod error;
pub mod metadata;
pub mod model_metrics;
pub mod process_status;
pub mod tenant;
pub mod types;
