use axum::http::Uri;
use serde::Serialize;

use crate::envelope::ApiResponse;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// GET /api/health: liveness only, never touches the agent.
pub async fn health() -> ApiResponse<Health> {
    ApiResponse::ok(Health { status: "ok" })
}

/// Fallback for every unmatched path, and for a known path hit with the
/// wrong method.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(format!("no route for {}", uri.path()))
}
