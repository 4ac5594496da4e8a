//! Domain failures, independent of HTTP. The API layer decides statuses.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Lookup by a natural key such as a slug.
    #[error("{entity} '{key}' not found")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
