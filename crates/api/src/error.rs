use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bookbase_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses:
/// `{"success": false, "error": "...", "code": "..."}`, or
/// `{"success": false, "errors": [...], "code": "VALIDATION_ERROR"}` for
/// field-level validation failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bookbase_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// What goes in the body next to `"success": false`.
enum ErrorBody {
    Message(String),
    Errors(Vec<String>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, body) = match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    tracing::debug!(entity, id, "Entity not found");
                    (
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        ErrorBody::Message(format!("{entity} not found")),
                    )
                }
                CoreError::Validation(errors) => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    ErrorBody::Errors(errors),
                ),
                CoreError::Duplicate(msg) => (
                    StatusCode::BAD_REQUEST,
                    "DUPLICATE",
                    ErrorBody::Message(msg),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(&err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                ErrorBody::Message(msg),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                ErrorBody::Message(msg),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = match body {
            ErrorBody::Message(message) => json!({
                "success": false,
                "error": message,
                "code": code,
            }),
            ErrorBody::Errors(errors) => json!({
                "success": false,
                "errors": errors,
                "code": code,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, ErrorBody) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        ErrorBody::Message("An internal error occurred".to_string()),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and body.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations (SQLSTATE 23505) on a `uq_` constraint map to a 400
///   duplicate error. This catches the race where another writer inserts the
///   same ISBN between the duplicate check and the insert.
/// - Check violations (SQLSTATE 23514) map to a 400 validation error.
/// - Pool exhaustion and connection failures map to 500 "Database unavailable".
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, ErrorBody) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            ErrorBody::Message("Resource not found".to_string()),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some("23505") if constraint.starts_with("uq_") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "DUPLICATE",
                        ErrorBody::Message(format!(
                            "Duplicate value violates unique constraint: {constraint}"
                        )),
                    );
                }
                Some("23514") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        ErrorBody::Errors(vec![format!(
                            "Value violates check constraint: {constraint}"
                        )]),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => {
            tracing::error!(error = %err, "Database unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_UNAVAILABLE",
                ErrorBody::Message("Database unavailable".to_string()),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
