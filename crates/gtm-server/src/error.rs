use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gtm_core::error::GtmError;

use crate::envelope::ApiResponse;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 404 errors
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 404 through
/// the `anyhow::Error` chain without touching the `GtmError` enum.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. Always renders the
/// `{ "success": false, "error": ... }` envelope.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(GtmError::InvalidRequest(msg.into()).into())
    }

    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    pub fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<NotFoundError>().is_some() {
            return StatusCode::NOT_FOUND;
        }
        match self.0.downcast_ref::<GtmError>() {
            Some(e) => match e {
                GtmError::EscalationNotFound(_) | GtmError::ConfigNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                GtmError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                GtmError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
                GtmError::Store(_)
                | GtmError::CorruptState(_)
                | GtmError::UnsupportedVersion(_)
                | GtmError::Config(_)
                | GtmError::Internal(_)
                | GtmError::Io(_)
                | GtmError::Yaml(_)
                | GtmError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ApiResponse::<()>::failure(self.0.to_string());
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
