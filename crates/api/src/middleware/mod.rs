//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller identified by a JWT Bearer token.
//! - [`rbac::Authorized`] -- the caller plus their effective permissions,
//!   loaded from the database on every request.
//! - [`rbac::RequirePermission`] -- rejects callers lacking one fixed permission.

pub mod auth;
pub mod rbac;
