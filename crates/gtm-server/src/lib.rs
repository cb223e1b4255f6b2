pub mod agent;
pub mod envelope;
pub mod error;
pub mod routes;
pub mod state;

use std::path::Path;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use gtm_core::config::ServerConfig;
use gtm_core::store::RedbStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agent::{AgentHandle, AgentOptions};

/// Path prefix for the dashboard API.
pub const API_PREFIX: &str = "/api/v1/gtm_system";

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/status", get(routes::status::get_status))
        .route("/metrics", get(routes::status::get_metrics))
        .route("/parameters", get(routes::status::get_parameters))
        .route("/analytics", get(routes::status::get_analytics))
        // Activity
        .route("/events", get(routes::events::list_events))
        .route("/logs", get(routes::events::list_logs))
        // Escalations
        .route("/escalations", get(routes::escalations::list_escalations))
        .route(
            "/escalations/{id}",
            post(routes::escalations::resolve_escalation),
        )
        // Agent configs
        .route(
            "/configs",
            get(routes::configs::list_configs).post(routes::configs::update_config),
        )
        .method_not_allowed_fallback(routes::health::not_found);

    Router::new()
        .route("/api/health", get(routes::health::health))
        .nest(API_PREFIX, api)
        .fallback(routes::health::not_found)
        .method_not_allowed_fallback(routes::health::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Open the state store and activate the orchestration agent for `root`.
pub async fn activate(
    root: &Path,
    config: &ServerConfig,
    rng_seed: Option<u64>,
) -> anyhow::Result<AgentHandle> {
    let db_path = config.db_path(root);
    let store = tokio::task::spawn_blocking(move || RedbStore::open(&db_path)).await??;
    let options = AgentOptions {
        tick_interval: config.tick_interval(),
        mailbox_capacity: config.mailbox_capacity,
        rng_seed,
    };
    Ok(AgentHandle::activate(Arc::new(store), options).await?)
}

/// Serve the API on a pre-bound listener until the future completes.
///
/// Accepts a `TcpListener` that was already bound so the caller can read the
/// actual port before starting (useful when `port = 0` and the OS picks a
/// free port).
pub async fn serve_on(agent: AgentHandle, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(state::AppState::new(agent));

    tracing::info!("GTM mission control listening on http://localhost:{actual_port}{API_PREFIX}");

    axum::serve(listener, app).await?;
    Ok(())
}
