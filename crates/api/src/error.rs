//! The error type every handler returns, and how it becomes a response.
//!
//! Error bodies are always `{"error": <message>, "code": <CODE>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pressdesk_core::error::CoreError;
use pressdesk_db::repositories::SyncError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed input that is not a field validation failure, such as a
    /// reference to a row that does not exist.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Logged, then reported to the client without detail.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::UnknownIds { entity, ids } => {
                let listed = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                AppError::BadRequest(format!("Unknown {entity} ids: {listed}"))
            }
            SyncError::Database(e) => AppError::Database(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

/// Status, machine code, and client-facing message for one error.
type Rendered = (StatusCode, &'static str, String);

fn internal() -> Rendered {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_owned(),
    )
}

fn render_core(err: &CoreError) -> Rendered {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::NotFoundByKey { entity, key } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} '{key}' not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Constraint naming carries meaning here: `uq_*` unique indexes and `fk_*`
/// foreign keys surface as 409, `ck_*` checks as 400. Anything else is a bug.
fn render_sqlx(err: &sqlx::Error) -> Rendered {
    let sqlx::Error::Database(db_err) = err else {
        if matches!(err, sqlx::Error::RowNotFound) {
            return (StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found".to_owned());
        }
        tracing::error!(error = %err, "Database error");
        return internal();
    };

    let constraint = db_err.constraint().unwrap_or_default();
    match (db_err.code().as_deref(), constraint) {
        (Some("23505"), c) if c.starts_with("uq_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {c}"),
        ),
        (Some("23503"), c) if c.starts_with("fk_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Record is still referenced ({c})"),
        ),
        (Some("23514"), c) if c.starts_with("ck_") => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value violates check constraint: {c}"),
        ),
        _ => {
            tracing::error!(error = %db_err, constraint, "Database error");
            internal()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = match &self {
            AppError::Core(core) => render_core(core),
            AppError::Database(err) => render_sqlx(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };
        (status, Json(ErrorBody { error, code })).into_response()
    }
}
