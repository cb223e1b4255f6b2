use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use gtm_core::model::{Escalation, EscalationAction};
use serde::{Deserialize, Serialize};

use super::json_body;
use crate::envelope::ApiResponse;
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /escalations: pending escalations only; resolved ones are gone.
pub async fn list_escalations(
    State(app): State<AppState>,
) -> Result<ApiResponse<Vec<Escalation>>, AppError> {
    Ok(ApiResponse::ok(app.agent.escalations().await?))
}

// ---------------------------------------------------------------------------
// Resolve
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    pub action: EscalationAction,
}

#[derive(Debug, Serialize)]
pub struct ResolveReply {
    pub message: String,
}

/// POST /escalations/{id}: approve or deny a pending escalation.
pub async fn resolve_escalation(
    State(app): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ResolveBody>, JsonRejection>,
) -> Result<ApiResponse<ResolveReply>, AppError> {
    let body = json_body(body)?;
    let message = app.agent.resolve_escalation(id, body.action).await?;
    Ok(ApiResponse::ok(ResolveReply { message }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentHandle, AgentOptions};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use gtm_core::store::MemoryStore;
    use std::sync::Arc;

    async fn app() -> AppState {
        let agent = AgentHandle::activate(Arc::new(MemoryStore::new()), AgentOptions::default())
            .await
            .unwrap();
        AppState::new(agent)
    }

    #[tokio::test]
    async fn list_returns_seeded_escalation() {
        let resp = list_escalations(State(app().await)).await.unwrap();
        let items = resp.data.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "ESC-001");
    }

    #[tokio::test]
    async fn resolve_returns_message() {
        let app = app().await;
        let resp = resolve_escalation(
            State(app.clone()),
            Path("ESC-001".to_string()),
            Ok(Json(ResolveBody {
                action: EscalationAction::Deny,
            })),
        )
        .await
        .unwrap();
        assert_eq!(resp.data.unwrap().message, "Escalation ESC-001 denied.");
    }

    #[tokio::test]
    async fn resolve_unknown_is_404() {
        let err = resolve_escalation(
            State(app().await),
            Path("ESC-404".to_string()),
            Ok(Json(ResolveBody {
                action: EscalationAction::Approve,
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
