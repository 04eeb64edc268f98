use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;

use super::extract::{AppJson, AppQuery};
use crate::error::AppError;
use crate::models::*;
use crate::services::{Dashboard, dashboard};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/courses", get(list_courses).post(create_course))
        .route("/api/courses/{id}", axum::routing::delete(delete_course))
        .route("/api/assignments", get(list_assignments).post(create_assignment))
        .route(
            "/api/assignments/{id}",
            get(get_assignment)
                .patch(update_assignment)
                .delete(delete_assignment),
        )
        .route("/api/assignments/{id}/snooze", post(snooze_assignment))
        .route("/api/reminders", get(list_reminders))
        .route("/api/dashboard", get(show_dashboard))
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.gateway().list_courses().await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = state.gateway().create_course(req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.gateway().delete_course(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_assignments(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AssignmentQuery>,
) -> Result<Json<Vec<Assignment>>, AppError> {
    let assignments = state.gateway().list_assignments(query).await?;
    Ok(Json(assignments))
}

async fn create_assignment(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewAssignmentRequest>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    let assignment = state.gateway().create_assignment(req).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = state.gateway().get_assignment(&id).await?;
    Ok(Json(assignment))
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<AssignmentPatch>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = state.gateway().update_assignment(&id, patch).await?;
    Ok(Json(assignment))
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.gateway().delete_assignment(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn snooze_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = state.gateway().snooze_reminder(&id).await?;
    Ok(Json(assignment))
}

async fn list_reminders(State(state): State<AppState>) -> Result<Json<Vec<Assignment>>, AppError> {
    let reminders = state.gateway().reminders().await?;
    Ok(Json(reminders))
}

async fn show_dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, AppError> {
    let dashboard = dashboard::load(&state.gateway(), Utc::now()).await?;
    Ok(Json(dashboard))
}
