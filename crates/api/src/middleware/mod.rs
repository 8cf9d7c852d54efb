//! Request extractors for cross-cutting concerns.
//!
//! - [`tenant::Tenant`] -- Resolves the tenant a request acts on.

pub mod tenant;
