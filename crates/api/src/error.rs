use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ocr_gateway_core::error::CoreError;
use ocr_gateway_core::runner::InvocationFailure;
use serde_json::json;

/// Message returned for an unparseable POST body.
pub const INVALID_JSON_MESSAGE: &str = "invalid JSON payload";

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] so every failure renders as a JSON body with
/// at least `error` and `code` fields.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `ocr_gateway_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The recognition script ran and failed.
    #[error(transparent)]
    Invocation(#[from] InvocationFailure),

    /// The POST body was not valid JSON for the expected shape.
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Core(CoreError::InvalidInput(msg)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg, "code": "INVALID_INPUT" }),
            ),
            AppError::InvalidJson(details) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": INVALID_JSON_MESSAGE,
                    "details": details,
                    "code": "INVALID_JSON",
                }),
            ),
            // Script failures go back verbatim, with whatever stdout was captured.
            AppError::Invocation(failure) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": failure.detail,
                    "raw_output": failure.raw_output,
                    "code": failure.kind.code(),
                }),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
