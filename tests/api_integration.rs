//! End-to-end API integration tests
//!
//! These tests drive the HTTP tool surface through the router, covering:
//! - Agent registration and listing
//! - Task creation, delegation, progress and completion
//! - Caller-side validation and conflict reporting
//! - The halt directive on agent-facing actions

use std::sync::Arc;
use std::time::Duration;

use agent_coordinator::api;
use agent_coordinator::coordination::Coordinator;
use agent_coordinator::infrastructure::repositories::InMemoryCoordinationStore;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for oneshot

/// Setup test application over a fresh in-memory store
fn setup_app() -> Router {
    let coordinator = Coordinator::new(Arc::new(InMemoryCoordinationStore::new()))
        .with_poll_interval(Duration::from_millis(10));
    api::router(coordinator)
}

/// Send a request and decode the JSON body (Null when empty)
async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn register(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/agents", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app();

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_register_and_list_agents() {
    let app = setup_app();
    let first = register(&app).await;
    let second = register(&app).await;

    let (status, body) = send(&app, "GET", "/api/agents", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.as_str()));
    assert!(ids.contains(&second.as_str()));

    let (status, body) = send(&app, "GET", &format!("/api/agents/{}", first), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert!(body["name"].is_null());
    assert!(body["currentTaskId"].is_null());

    let (status, _) = send(&app, "GET", "/api/agents?status=sleeping", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_task_validates_prompt() {
    let app = setup_app();

    let (status, body) = send(&app, "POST", "/api/tasks", Some(json!({"prompt": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Prompt"));

    let (status, body) = send(&app, "POST", "/api/tasks", Some(json!({"prompt": "index repo"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert!(body["agentId"].is_null());
    assert_eq!(body["updates"], json!([]));
    assert!(body["result"].is_null());
}

#[tokio::test]
async fn test_delegate_update_complete_flow() {
    let app = setup_app();
    let agent_id = register(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/delegate",
        Some(json!({"prompt": "write tests", "name": "tester"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["agent"]["id"], agent_id.as_str());
    assert_eq!(body["agent"]["status"], "busy");
    assert_eq!(body["task"]["status"], "in_progress");
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", &format!("/api/agents/{}/wait", agent_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "task");
    assert_eq!(body["task"]["id"], task_id.as_str());

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/tasks/{}/updates", task_id),
        Some(json!({"message": "half done"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updates"][0]["message"], "half done");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/tasks/{}/complete", task_id),
        Some(json!({"result": "all green"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["result"], "all green");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/tasks/{}/complete", task_id),
        Some(json!({"result": "again"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("completed"));

    let (_, body) = send(&app, "GET", "/api/agents/by-name/tester", None).await;
    assert_eq!(body["status"], "idle");
    assert_eq!(body["id"], agent_id.as_str());

    let (_, body) = send(&app, "GET", &format!("/api/agents/{}/tasks", agent_id), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delegate_without_idle_agent_conflicts() {
    let app = setup_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/delegate",
        Some(json!({"prompt": "anything", "name": "W1"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["retryable"], false);
    let (_, tasks) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(tasks, json!([]));
}

#[tokio::test]
async fn test_assign_rejects_taken_name_and_busy_agent() {
    let app = setup_app();
    let first = register(&app).await;
    let second = register(&app).await;
    let (_, task_a) = send(&app, "POST", "/api/tasks", Some(json!({"prompt": "a"}))).await;
    let (_, task_b) = send(&app, "POST", "/api/tasks", Some(json!({"prompt": "b"}))).await;
    let task_a = task_a["id"].as_str().unwrap().to_string();
    let task_b = task_b["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/tasks/{}/assign", task_a),
        Some(json!({"agentId": first, "name": "W1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agentId"], first.as_str());

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/tasks/{}/assign", task_b),
        Some(json!({"agentId": second, "name": "W1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already in use"));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/tasks/{}/assign", task_b),
        Some(json!({"agentId": first, "name": "W9"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/tasks/{}/assign", uuid::Uuid::new_v4()),
        Some(json!({"agentId": second, "name": "W2"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_on_pending_task_conflicts() {
    let app = setup_app();
    let (_, task) = send(&app, "POST", "/api/tasks", Some(json!({"prompt": "later"}))).await;
    let task_id = task["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/tasks/{}/updates", task_id),
        Some(json!({"message": "too early"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, task) = send(&app, "GET", &format!("/api/tasks/{}", task_id), None).await;
    assert_eq!(task["updates"], json!([]));
}

#[tokio::test]
async fn test_remove_agent_and_wait_reports_removed() {
    let app = setup_app();
    let agent_id = register(&app).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/agents/{}", agent_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &format!("/api/agents/{}", agent_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", &format!("/api/agents/{}/wait", agent_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"outcome": "removed"}));
}

#[tokio::test]
async fn test_halt_directive_blocks_agent_actions() {
    let app = setup_app();
    let agent_id = register(&app).await;

    let (status, body) = send(&app, "POST", "/api/halt", Some(json!({"reason": "operator stop"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["halted"], true);

    let (status, body) = send(&app, "GET", &format!("/api/agents/{}/wait", agent_id), None).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["halted"], true);
    assert_eq!(body["reason"], "operator stop");
    assert!(body["directive"].as_str().unwrap().starts_with("HALT"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/delegate",
        Some(json!({"prompt": "more work", "name": "W1"})),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["halted"], true);

    let (status, _) = send(&app, "DELETE", "/api/halt", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, "GET", "/api/halt", None).await;
    assert_eq!(body["halted"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/api/delegate",
        Some(json!({"prompt": "more work", "name": "W1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_clear_state_wipes_everything() {
    let app = setup_app();
    register(&app).await;
    send(&app, "POST", "/api/tasks", Some(json!({"prompt": "x"}))).await;

    let (status, _) = send(&app, "DELETE", "/api/state", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, agents) = send(&app, "GET", "/api/agents", None).await;
    let (_, tasks) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(agents, json!([]));
    assert_eq!(tasks, json!([]));
}
