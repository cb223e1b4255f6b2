use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use gtm_core::store::{MemoryStore, RedbStore, StateStore};
use gtm_server::agent::{AgentHandle, AgentOptions};
use gtm_server::state::AppState;
use http_body_util::BodyExt;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn quiet_options() -> AgentOptions {
    AgentOptions {
        tick_interval: Duration::from_secs(3600),
        ..AgentOptions::default()
    }
}

async fn activate(store: Arc<dyn StateStore>) -> AgentHandle {
    AgentHandle::activate(store, quiet_options()).await.unwrap()
}

async fn app() -> axum::Router {
    let agent = activate(Arc::new(MemoryStore::new())).await;
    gtm_server::build_router(AppState::new(agent))
}

fn api(path: &str) -> String {
    format!("{}{path}", gtm_server::API_PREFIX)
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a raw body via `oneshot` and return (status, parsed JSON body).
async fn post_raw(app: axum::Router, uri: &str, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_raw(app, uri, serde_json::to_vec(&body).unwrap()).await
}

/// Send a request with any method and an empty JSON object body.
async fn send(app: axum::Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{}"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn sdo_config(quota: u32, threshold: &str) -> serde_json::Value {
    json!({
        "id": "sdo-agent",
        "name": "SDO AGENT",
        "enabled": false,
        "apiQuotaPerDay": quota,
        "riskThreshold": threshold,
    })
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_ok() {
    let (status, json) = get(app().await, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn status_returns_full_aggregate_in_envelope() {
    let (status, json) = get(app().await, &api("/status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json.get("error").is_none());
    let data = &json["data"];
    assert_eq!(data["metrics"].as_array().unwrap().len(), 6);
    assert_eq!(data["missionParameters"].as_array().unwrap().len(), 4);
    assert_eq!(data["escalations"][0]["id"], "ESC-001");
    assert_eq!(data["agentConfigs"].as_array().unwrap().len(), 5);
    assert_eq!(data["analyticsData"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn metrics_use_wire_labels() {
    let (status, json) = get(app().await, &api("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    let labels: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        ["BUDGET", "SPEND", "CAC TARGET", "CURRENT CAC", "PIPELINE", "CLOSED WON"]
    );
}

#[tokio::test]
async fn parameters_and_analytics_are_served() {
    let app = app().await;
    let (status, json) = get(app.clone(), &api("/parameters")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["label"], "MISSION GOAL");

    let (status, json) = get(app, &api("/analytics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][6]["month"], "Jul");
}

#[tokio::test]
async fn events_are_newest_first() {
    let (status, json) = get(app().await, &api("/events")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["EVT-3457", "EVT-3456"]);
}

#[tokio::test]
async fn logs_carry_type_field() {
    let (status, json) = get(app().await, &api("/logs")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["id"], "LOG-001");
    assert_eq!(json["data"][0]["type"], "REASONING");
    assert_eq!(json["data"][1]["type"], "OBSERVATION");
}

#[tokio::test]
async fn unmatched_path_is_404_envelope() {
    let (status, json) = get(app().await, &api("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn wrong_method_on_known_path_is_404_envelope() {
    let app = app().await;
    for (method, path) in [
        ("POST", api("/status")),
        ("GET", api("/escalations/ESC-001")),
        ("DELETE", api("/configs")),
        ("POST", "/api/health".to_string()),
    ] {
        let (status, json) = send(app.clone(), method, &path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {path}");
        assert_eq!(json["success"], false, "{method} {path}");
        assert!(json["error"].is_string(), "{method} {path}");
    }

    // nothing was resolved along the way
    let (_, json) = get(app, &api("/escalations")).await;
    assert_eq!(json["data"][0]["id"], "ESC-001");
}

// ---------------------------------------------------------------------------
// Escalations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolve_escalation_then_again_is_404() {
    let app = app().await;
    let uri = api("/escalations/ESC-001");

    let (status, json) = post_json(app.clone(), &uri, json!({ "action": "approve" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["message"], "Escalation ESC-001 approved.");

    let (_, json) = get(app.clone(), &api("/escalations")).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let (_, json) = get(app.clone(), &api("/events")).await;
    assert_eq!(json["data"][0]["agent"], "ORCHESTRATOR");
    assert_eq!(json["data"][0]["status"], "OK");
    assert_eq!(
        json["data"][0]["action"],
        "Approved escalation ESC-001: DISCOUNT > 20%"
    );

    let (status, json) = post_json(app, &uri, json!({ "action": "approve" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn resolve_with_unknown_action_is_400() {
    let (status, json) = post_json(
        app().await,
        &api("/escalations/ESC-001"),
        json!({ "action": "escalate" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn resolve_with_malformed_json_is_400() {
    let (status, _) = post_raw(
        app().await,
        &api("/escalations/ESC-001"),
        b"{not json".to_vec(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Agent configs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_config_replaces_whole_record() {
    let app = app().await;
    let (status, json) = post_json(app.clone(), &api("/configs"), sdo_config(42, "HIGH")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["apiQuotaPerDay"], 42);

    let (_, json) = get(app.clone(), &api("/configs")).await;
    let sdo = &json["data"][0];
    assert_eq!(sdo["id"], "sdo-agent");
    assert_eq!(sdo["enabled"], false);
    assert_eq!(sdo["riskThreshold"], "HIGH");

    let (_, json) = get(app, &api("/events")).await;
    assert_eq!(json["data"][0]["status"], "INFO");
    assert_eq!(json["data"][0]["action"], "Updated config for SDO AGENT");
}

#[tokio::test]
async fn update_unknown_config_is_404() {
    let mut body = sdo_config(1, "LOW");
    body["id"] = json!("ghost-agent");
    let (status, json) = post_json(app().await, &api("/configs"), body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn update_config_without_id_is_400() {
    let mut body = sdo_config(1, "LOW");
    body.as_object_mut().unwrap().remove("id");
    let (status, _) = post_json(app().await, &api("/configs"), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_config_with_malformed_json_is_400() {
    let (status, json) = post_raw(app().await, &api("/configs"), b"[1, 2".to_vec()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

// ---------------------------------------------------------------------------
// Durability
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mutations_survive_restart() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join(".gtm/state.redb");

    {
        let store: Arc<dyn StateStore> = Arc::new(RedbStore::open(&db).unwrap());
        let agent = activate(store).await;
        let app = gtm_server::build_router(AppState::new(agent.clone()));

        let (status, _) = post_json(
            app.clone(),
            &api("/escalations/ESC-001"),
            json!({ "action": "deny" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post_json(app, &api("/configs"), sdo_config(7, "MEDIUM")).await;
        assert_eq!(status, StatusCode::OK);

        agent.shutdown().await.unwrap();
    }

    let store: Arc<dyn StateStore> = Arc::new(RedbStore::open(&db).unwrap());
    let agent = activate(store).await;
    let app = gtm_server::build_router(AppState::new(agent));

    let (_, json) = get(app.clone(), &api("/escalations")).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let (_, json) = get(app.clone(), &api("/configs")).await;
    assert_eq!(json["data"][0]["apiQuotaPerDay"], 7);
    assert_eq!(json["data"][4]["enabled"], false);

    let (_, json) = get(app, &api("/events")).await;
    let actions: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions[0], "Updated config for SDO AGENT");
    assert!(actions[1].starts_with("Denied escalation ESC-001"));
}
