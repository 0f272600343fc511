use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use agrivision_core::error::{AuthError, CoreError};
use agrivision_detector::DetectorError;
use agrivision_pipeline::PipelineError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain error types and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `agrivision_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An account or credential error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A detection engine error.
    #[error(transparent)]
    Detector(#[from] DetectorError),

    /// A video/live pipeline error.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A conflicting request (e.g. a live session already running).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A missing resource with a human-readable message.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Account / credential errors ---
            AppError::Auth(auth) => classify_auth_error(auth),

            // --- Detection engine errors ---
            AppError::Detector(det) => match det {
                DetectorError::ImageDecode(msg) => (
                    StatusCode::BAD_REQUEST,
                    "BAD_IMAGE",
                    format!("Could not decode uploaded image: {msg}"),
                ),
                DetectorError::ModelLoad { .. } | DetectorError::Inference(_) => {
                    tracing::error!(error = %det, "Detection engine error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INFERENCE_ERROR",
                        "Detection failed".to_string(),
                    )
                }
            },

            // --- Pipeline errors ---
            AppError::Pipeline(pipe) => match pipe {
                PipelineError::VideoNotFound(_)
                | PipelineError::EmptyVideo
                | PipelineError::ExecutionFailed { .. } => (
                    StatusCode::BAD_REQUEST,
                    "BAD_VIDEO",
                    "Could not read the uploaded video".to_string(),
                ),
                PipelineError::Detector(DetectorError::ImageDecode(msg)) => (
                    StatusCode::BAD_REQUEST,
                    "BAD_VIDEO",
                    format!("Could not decode extracted frame: {msg}"),
                ),
                other => {
                    tracing::error!(error = %other, "Pipeline error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "PIPELINE_ERROR",
                        "Video processing failed".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map account errors to HTTP statuses.
///
/// Duplicates and mismatches are client mistakes (400), an unknown user on
/// login is 404, and a wrong password is 401.
fn classify_auth_error(err: &AuthError) -> (StatusCode, &'static str, String) {
    let status = match err {
        AuthError::DuplicateUsername
        | AuthError::DuplicateEmail
        | AuthError::PasswordMismatch
        | AuthError::NothingToUpdate => StatusCode::BAD_REQUEST,
        AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::BadPassword => StatusCode::UNAUTHORIZED,
    };
    (status, "AUTH_ERROR", err.to_string())
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map
///   to 400; they backstop the application-level duplicate checks.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::BAD_REQUEST,
                        "DUPLICATE",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
