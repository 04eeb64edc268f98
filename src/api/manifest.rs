use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::action::Action;
use crate::config::AppInfo;
use crate::models::{AssignmentStatus, AssignmentType, CourseColor};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Capability {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<Parameter>,
}

fn param(name: &'static str, kind: ParamType, required: bool, description: impl Into<String>) -> Parameter {
    Parameter {
        name,
        kind,
        required,
        description: Some(description.into()),
    }
}

fn bare(name: &'static str, kind: ParamType) -> Parameter {
    Parameter {
        name,
        kind,
        required: false,
        description: None,
    }
}

fn one_of<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn id_param(what: &str) -> Parameter {
    param("id", ParamType::String, true, format!("{} UUID", what))
}

pub fn describe(action: Action) -> Capability {
    use ParamType::{Boolean, Number, String as Text};

    let (description, parameters) = match action {
        Action::ListCourses => ("List all courses.", vec![]),
        Action::AddCourse => (
            "Create a new course.",
            vec![
                param("name", Text, true, "Course name"),
                param("code", Text, false, "Course code (e.g. CS101)"),
                param(
                    "color",
                    Text,
                    false,
                    format!("Color for the course badge. One of: {}", one_of(&CourseColor::ALL)),
                ),
            ],
        ),
        Action::DeleteCourse => (
            "Delete a course and all its assignments.",
            vec![id_param("Course")],
        ),
        Action::ListAssignments => (
            "List assignments, optionally filtered by course, status, or upcoming only.",
            vec![
                param("course_id", Text, false, "Filter by course UUID"),
                param(
                    "status",
                    Text,
                    false,
                    format!("Filter by status. One of: {}", one_of(&AssignmentStatus::ALL)),
                ),
                param(
                    "upcoming",
                    Boolean,
                    false,
                    "If true, only return assignments with due_at in the future",
                ),
            ],
        ),
        Action::GetAssignment => ("Get a single assignment by ID.", vec![id_param("Assignment")]),
        Action::AddAssignment => (
            "Create a new assignment. Reminder is automatically set to 3 days before the due date.",
            vec![
                param("course_id", Text, true, "Course UUID"),
                param("title", Text, true, "Assignment title"),
                param(
                    "type",
                    Text,
                    false,
                    format!("Assignment type. One of: {}", one_of(&AssignmentType::ALL)),
                ),
                param(
                    "due_at",
                    Text,
                    true,
                    "Due date/time in ISO 8601 format, e.g. 2026-04-15T23:59:00Z",
                ),
                param("weight", Number, false, "Grade weight as a percentage (e.g. 20 for 20%)"),
                param("description", Text, false, "Optional notes"),
                param(
                    "remind_at",
                    Text,
                    false,
                    "ISO 8601 datetime overriding the default reminder, or null for none",
                ),
            ],
        ),
        Action::UpdateAssignment => (
            "Update fields on an existing assignment. Marking submitted/completed clears the reminder.",
            vec![
                id_param("Assignment"),
                bare("title", Text),
                param("type", Text, false, format!("One of: {}", one_of(&AssignmentType::ALL))),
                param("due_at", Text, false, "ISO 8601 datetime"),
                bare("weight", Number),
                bare("description", Text),
                param("status", Text, false, format!("One of: {}", one_of(&AssignmentStatus::ALL))),
                param("remind_at", Text, false, "ISO 8601 datetime or null to clear"),
            ],
        ),
        Action::DeleteAssignment => ("Delete an assignment.", vec![id_param("Assignment")]),
        Action::GetReminders => (
            "Get all pending assignments whose reminder time has passed.",
            vec![],
        ),
        Action::SnoozeReminder => (
            "Snooze an assignment reminder by 1 hour.",
            vec![id_param("Assignment")],
        ),
    };

    Capability {
        name: action.as_str(),
        description,
        parameters,
    }
}

pub fn capabilities() -> Vec<Capability> {
    Action::ALL.into_iter().map(describe).collect()
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/capabilities", get(list_capabilities))
        .route("/info", get(show_info))
}

async fn list_capabilities() -> Json<Vec<Capability>> {
    Json(capabilities())
}

async fn show_info(State(state): State<AppState>) -> Json<AppInfo> {
    Json(state.info.as_ref().clone())
}
