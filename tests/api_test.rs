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

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn create_course(app: &Router, name: &str, code: &str) -> String {
    let (status, course) = send(
        app,
        Method::POST,
        "/api/courses",
        Some(json!({ "name": name, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    course["id"].as_str().expect("course id").to_string()
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, _) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_assignment_lifecycle() {
    let app = app().await;
    let course_id = create_course(&app, "CS 101", "CS101").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({
            "course_id": course_id,
            "title": "HW1",
            "due_at": "2026-04-15T23:59:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["type"], "assignment");
    assert_eq!(created["remind_at"], "2026-04-12T23:59:00Z");
    assert_eq!(created["course"]["code"], "CS101");
    let id = created["id"].as_str().expect("assignment id").to_string();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/assignments/{id}"),
        Some(json!({ "status": "submitted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "submitted");
    assert!(updated["remind_at"].is_null());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/courses/{course_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/api/assignments/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");
}

#[tokio::test]
async fn test_create_assignment_validation() {
    let app = app().await;
    let course_id = create_course(&app, "Physics", "").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({ "course_id": course_id, "title": "   ", "due_at": "2026-04-15T23:59:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "title is required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({ "course_id": course_id, "title": "Lab" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "due_at is required");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({ "course_id": course_id, "title": "Lab", "due_at": "next tuesday" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_due_at_is_missing() {
    let app = app().await;
    let course_id = create_course(&app, "Physics", "PH1").await;

    for due_at in ["", "   "] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/assignments",
            Some(json!({ "course_id": course_id, "title": "Lab", "due_at": due_at })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "due_at is required");
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({ "course_id": course_id, "title": "Lab", "due_at": "soon" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().expect("message");
    assert!(message.contains("due_at: must be a valid timestamp"), "{message}");
}

#[tokio::test]
async fn test_course_validation() {
    let app = app().await;

    let (status, body) = send(&app, Method::POST, "/api/courses", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/courses",
        Some(json!({ "name": "Art", "color": "magenta" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, course) = send(&app, Method::POST, "/api/courses", Some(json!({ "name": "Art" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(course["color"], "indigo");
    assert_eq!(course["code"], "");
}

#[tokio::test]
async fn test_patch_ignores_course_id() {
    let app = app().await;
    let first = create_course(&app, "Math", "MA1").await;
    let second = create_course(&app, "History", "HI1").await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({ "course_id": first, "title": "Problem set", "due_at": "2026-05-01T12:00:00Z" })),
    )
    .await;
    let id = created["id"].as_str().expect("assignment id").to_string();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/assignments/{id}"),
        Some(json!({ "course_id": second, "title": "Problem set 2", "weight": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["course_id"], first);
    assert_eq!(updated["title"], "Problem set 2");
    assert_eq!(updated["weight"], 15.0);
}

#[tokio::test]
async fn test_update_missing_assignment() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/assignments/does-not-exist",
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/assignments/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_list_filters() {
    let app = app().await;
    let math = create_course(&app, "Math", "MA1").await;
    let art = create_course(&app, "Art", "AR1").await;

    for (course, title, due) in [
        (&math, "Old quiz", "2020-01-10T10:00:00Z"),
        (&math, "Final", "2099-06-01T10:00:00Z"),
        (&art, "Sketchbook", "2099-03-01T10:00:00Z"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/assignments",
            Some(json!({ "course_id": course, "title": title, "due_at": due })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = send(&app, Method::GET, "/api/assignments", None).await;
    let titles: Vec<&str> = all
        .as_array()
        .expect("array")
        .iter()
        .map(|a| a["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["Old quiz", "Sketchbook", "Final"]);

    let (_, upcoming) = send(&app, Method::GET, "/api/assignments?upcoming=true", None).await;
    assert_eq!(upcoming.as_array().expect("array").len(), 2);

    let (_, by_course) = send(&app, Method::GET, &format!("/api/assignments?course_id={math}"), None).await;
    assert_eq!(by_course.as_array().expect("array").len(), 2);

    let (_, submitted) = send(&app, Method::GET, "/api/assignments?status=submitted", None).await;
    assert!(submitted.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn test_reminders_skip_late_and_snooze() {
    let app = app().await;
    let course_id = create_course(&app, "Biology", "BIO").await;

    let mut ids = Vec::new();
    for title in ["Essay", "Lab report"] {
        let (_, created) = send(
            &app,
            Method::POST,
            "/api/assignments",
            Some(json!({
                "course_id": course_id,
                "title": title,
                "due_at": "2099-01-01T00:00:00Z",
                "remind_at": "2020-01-01T00:00:00Z",
            })),
        )
        .await;
        assert_eq!(created["remind_at"], "2020-01-01T00:00:00Z");
        ids.push(created["id"].as_str().expect("assignment id").to_string());
    }

    let (_, late) = send(
        &app,
        Method::PATCH,
        &format!("/api/assignments/{}", ids[1]),
        Some(json!({ "status": "late" })),
    )
    .await;
    assert_eq!(late["remind_at"], "2020-01-01T00:00:00Z");

    let (status, reminders) = send(&app, Method::GET, "/api/reminders", None).await;
    assert_eq!(status, StatusCode::OK);
    let reminders = reminders.as_array().expect("array");
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0]["id"], ids[0].as_str());

    let (status, snoozed) = send(
        &app,
        Method::POST,
        &format!("/api/assignments/{}/snooze", ids[0]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snoozed["remind_at"], "2020-01-01T01:00:00Z");
}

#[tokio::test]
async fn test_create_without_reminder() {
    let app = app().await;
    let course_id = create_course(&app, "Chem", "CH1").await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({
            "course_id": course_id,
            "title": "Reading",
            "due_at": "2026-04-15T23:59:00Z",
            "remind_at": null,
        })),
    )
    .await;
    assert!(created["remind_at"].is_null());
}

#[tokio::test]
async fn test_dashboard() {
    let app = app().await;
    let course_id = create_course(&app, "Music", "MU1").await;
    send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({ "course_id": course_id, "title": "Recital", "due_at": "2099-01-01T00:00:00Z" })),
    )
    .await;

    let (status, dashboard) = send(&app, Method::GET, "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["courses"][0]["assignment_count"], 1);
    assert_eq!(dashboard["later"][0]["title"], "Recital");
    assert_eq!(dashboard["later"][0]["bucket"], "later");
    assert!(dashboard["groups"].as_array().expect("groups").is_empty());
    assert_eq!(dashboard["stats"]["due_today"], 0);
}
