use axum::extract::State;
use gtm_core::model::{AgentLog, Event};

use crate::envelope::ApiResponse;
use crate::error::AppError;
use crate::state::AppState;

/// GET /events: newest first.
pub async fn list_events(State(app): State<AppState>) -> Result<ApiResponse<Vec<Event>>, AppError> {
    Ok(ApiResponse::ok(app.agent.events().await?))
}

/// GET /logs: in append order.
pub async fn list_logs(
    State(app): State<AppState>,
) -> Result<ApiResponse<Vec<AgentLog>>, AppError> {
    Ok(ApiResponse::ok(app.agent.agent_logs().await?))
}
