use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use gtm_core::model::AgentConfig;

use super::json_body;
use crate::envelope::ApiResponse;
use crate::error::AppError;
use crate::state::AppState;

/// GET /configs
pub async fn list_configs(
    State(app): State<AppState>,
) -> Result<ApiResponse<Vec<AgentConfig>>, AppError> {
    Ok(ApiResponse::ok(app.agent.agent_configs().await?))
}

/// POST /configs: full replace of the config with the submitted id.
///
/// The body must be a complete `AgentConfig`; there is no partial patch.
pub async fn update_config(
    State(app): State<AppState>,
    body: Result<Json<AgentConfig>, JsonRejection>,
) -> Result<ApiResponse<AgentConfig>, AppError> {
    let config = json_body(body)?;
    Ok(ApiResponse::ok(app.agent.update_agent_config(config).await?))
}
