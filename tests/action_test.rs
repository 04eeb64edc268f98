use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use dontforget::api;
use dontforget::config::AppConfig;
use dontforget::db::SqliteStore;
use dontforget::state::AppState;

async fn app() -> Router {
    let store = SqliteStore::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create database");
    let info = AppConfig::defaults().expect("defaults").info;
    api::router(AppState::new(Arc::new(store), info))
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

async fn execute(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/execute")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    call(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).expect("request");
    call(app, request).await
}

async fn add_course(app: &Router) -> String {
    let (status, body) = execute(
        app,
        json!({ "action": "add_course", "parameters": { "name": "CS 101", "code": "CS101", "color": "sky" } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    body["data"]["id"].as_str().expect("course id").to_string()
}

#[tokio::test]
async fn test_course_actions() {
    let app = app().await;
    let id = add_course(&app).await;

    let (_, listed) = execute(&app, json!({ "action": "list_courses" })).await;
    assert_eq!(listed["success"], true);
    assert_eq!(listed["data"][0]["color"], "sky");
    assert!(listed.get("error").is_none());

    let (status, deleted) = execute(
        &app,
        json!({ "action": "delete_course", "parameters": { "id": id } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"], json!({ "deleted": true, "id": id }));

    let (_, listed) = execute(&app, json!({ "action": "list_courses", "parameters": null })).await;
    assert!(listed["data"].as_array().expect("array").is_empty());
}

#[tokio::test]
async fn test_assignment_actions() {
    let app = app().await;
    let course_id = add_course(&app).await;

    let (_, created) = execute(
        &app,
        json!({
            "action": "add_assignment",
            "parameters": {
                "course_id": course_id,
                "title": "HW1",
                "type": "project",
                "due_at": "2026-04-15T23:59:00Z",
                "weight": 20,
            }
        }),
    )
    .await;
    assert_eq!(created["success"], true);
    let assignment = &created["data"];
    assert_eq!(assignment["type"], "project");
    assert_eq!(assignment["remind_at"], "2026-04-12T23:59:00Z");
    let id = assignment["id"].as_str().expect("assignment id").to_string();

    let (_, fetched) = execute(
        &app,
        json!({ "action": "get_assignment", "parameters": { "id": id } }),
    )
    .await;
    assert_eq!(fetched["data"]["title"], "HW1");

    let (_, updated) = execute(
        &app,
        json!({
            "action": "update_assignment",
            "parameters": { "id": id, "status": "completed", "course_id": "elsewhere" }
        }),
    )
    .await;
    assert_eq!(updated["data"]["status"], "completed");
    assert_eq!(updated["data"]["course_id"], course_id.as_str());
    assert!(updated["data"]["remind_at"].is_null());

    let (_, listed) = execute(
        &app,
        json!({ "action": "list_assignments", "parameters": { "status": "completed" } }),
    )
    .await;
    assert_eq!(listed["data"].as_array().expect("array").len(), 1);

    let (_, deleted) = execute(
        &app,
        json!({ "action": "delete_assignment", "parameters": { "id": id } }),
    )
    .await;
    assert_eq!(deleted["data"]["deleted"], true);

    let (status, missing) = execute(
        &app,
        json!({ "action": "get_assignment", "parameters": { "id": id } }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["success"], false);
    assert_eq!(missing["error"], "Not found");
}

#[tokio::test]
async fn test_reminder_actions() {
    let app = app().await;
    let course_id = add_course(&app).await;

    let (_, created) = execute(
        &app,
        json!({
            "action": "add_assignment",
            "parameters": {
                "course_id": course_id,
                "title": "Essay",
                "due_at": "2099-01-01T00:00:00Z",
                "remind_at": "2020-01-01T00:00:00Z",
            }
        }),
    )
    .await;
    let id = created["data"]["id"].as_str().expect("assignment id").to_string();

    let (_, reminders) = execute(&app, json!({ "action": "get_reminders" })).await;
    assert_eq!(
        reminders["data"],
        json!([{
            "id": id,
            "role": "Essay",
            "company": "CS101",
            "url": "",
            "due_at": "2099-01-01T00:00:00Z",
            "remind_at": "2020-01-01T00:00:00Z",
        }])
    );

    let (_, snoozed) = execute(
        &app,
        json!({ "action": "snooze_reminder", "parameters": { "id": id } }),
    )
    .await;
    assert_eq!(snoozed["data"]["remind_at"], "2020-01-01T01:00:00Z");
}

#[tokio::test]
async fn test_action_errors() {
    let app = app().await;

    let (status, body) = execute(&app, json!({ "action": "drop_tables", "parameters": {} })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unknown action: drop_tables");
    assert!(body.get("data").is_none());

    let (status, body) = execute(&app, json!({ "action": "get_assignment", "parameters": {} })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "id is required");

    let (status, body) = execute(
        &app,
        json!({ "action": "add_assignment", "parameters": { "title": "Orphan" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "course_id is required");

    let (status, body) = execute(
        &app,
        json!({
            "action": "add_assignment",
            "parameters": { "course_id": "c1", "title": "HW", "due_at": "" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "due_at is required");

    let (status, body) = execute(
        &app,
        json!({
            "action": "add_assignment",
            "parameters": { "course_id": "c1", "title": "HW", "due_at": "soon" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid parameters: due_at: must be a valid timestamp");

    let (status, body) = execute(
        &app,
        json!({ "action": "add_assignment", "parameters": { "weight": "heavy" } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").starts_with("Invalid parameters: weight: "));

    let (status, body) = execute(&app, json!({ "parameters": {} })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_capabilities_and_info() {
    let app = app().await;

    let (status, caps) = get(&app, "/capabilities").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = caps
        .as_array()
        .expect("array")
        .iter()
        .map(|c| c["name"].as_str().expect("name"))
        .collect();
    assert_eq!(
        names,
        vec![
            "list_courses",
            "add_course",
            "delete_course",
            "list_assignments",
            "get_assignment",
            "add_assignment",
            "update_assignment",
            "delete_assignment",
            "get_reminders",
            "snooze_reminder",
        ]
    );

    let (status, info) = get(&app, "/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["title"], "DontForget");
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
}
