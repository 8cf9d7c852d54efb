//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&PgPool` and the caller's tenant first. Every query filters on
//! `tenant_id`; rows of other tenants are invisible.

pub mod group_repo;
pub mod metadata_repo;
pub mod model_metric_repo;
pub mod process_repo;

pub use group_repo::GroupRepo;
pub use metadata_repo::MetadataRepo;
pub use model_metric_repo::ModelMetricRepo;
pub use process_repo::ProcessRepo;
