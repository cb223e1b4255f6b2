use axum::extract::State;
use gtm_core::model::{AnalyticsDataPoint, Metric, MissionParameter, SystemState};

use crate::envelope::ApiResponse;
use crate::error::AppError;
use crate::state::AppState;

/// GET /status: the whole aggregate.
pub async fn get_status(
    State(app): State<AppState>,
) -> Result<ApiResponse<SystemState>, AppError> {
    Ok(ApiResponse::ok(app.agent.full_status().await?))
}

/// GET /metrics
pub async fn get_metrics(State(app): State<AppState>) -> Result<ApiResponse<Vec<Metric>>, AppError> {
    Ok(ApiResponse::ok(app.agent.metrics().await?))
}

/// GET /parameters
pub async fn get_parameters(
    State(app): State<AppState>,
) -> Result<ApiResponse<Vec<MissionParameter>>, AppError> {
    Ok(ApiResponse::ok(app.agent.mission_parameters().await?))
}

/// GET /analytics
pub async fn get_analytics(
    State(app): State<AppState>,
) -> Result<ApiResponse<Vec<AnalyticsDataPoint>>, AppError> {
    Ok(ApiResponse::ok(app.agent.analytics().await?))
}
