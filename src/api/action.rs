//! Single-endpoint command interface for automation callers.
//!
//! `POST /execute` takes `{action, parameters}` and answers with
//! `{success, data?, error?}`. Every action runs through the same
//! [`Gateway`] as the REST routes.

use std::fmt;
use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::info;

use crate::error::AppError;
use crate::models::{Assignment, AssignmentPatch, AssignmentQuery, NewAssignmentRequest, NewCourseRequest};
use crate::services::Gateway;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListCourses,
    AddCourse,
    DeleteCourse,
    ListAssignments,
    GetAssignment,
    AddAssignment,
    UpdateAssignment,
    DeleteAssignment,
    GetReminders,
    SnoozeReminder,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::ListCourses,
        Action::AddCourse,
        Action::DeleteCourse,
        Action::ListAssignments,
        Action::GetAssignment,
        Action::AddAssignment,
        Action::UpdateAssignment,
        Action::DeleteAssignment,
        Action::GetReminders,
        Action::SnoozeReminder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ListCourses => "list_courses",
            Action::AddCourse => "add_course",
            Action::DeleteCourse => "delete_course",
            Action::ListAssignments => "list_assignments",
            Action::GetAssignment => "get_assignment",
            Action::AddAssignment => "add_assignment",
            Action::UpdateAssignment => "update_assignment",
            Action::DeleteAssignment => "delete_assignment",
            Action::GetReminders => "get_reminders",
            Action::SnoozeReminder => "snooze_reminder",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| AppError::UnknownAction(s.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reminder in the shape the external reminder hub consumes.
#[derive(Debug, Serialize)]
pub struct HubReminder {
    pub id: String,
    pub role: String,
    pub company: String,
    pub url: String,
    pub due_at: DateTime<Utc>,
    pub remind_at: Option<DateTime<Utc>>,
}

impl From<Assignment> for HubReminder {
    fn from(a: Assignment) -> Self {
        let company = a
            .course
            .as_ref()
            .map(|c| c.short_label().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        Self {
            id: a.id,
            role: a.title,
            company,
            url: String::new(),
            due_at: a.due_at,
            remind_at: a.remind_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct IdParams {
    #[serde(default)]
    id: String,
}

fn params_as<T: DeserializeOwned>(params: &Value) -> Result<T, AppError> {
    serde_path_to_error::deserialize(params.clone())
        .map_err(|e| AppError::Validation(format!("Invalid parameters: {}", e)))
}

fn deleted(id: String) -> Value {
    json!({ "deleted": true, "id": id })
}

/// Runs one action against the gateway and returns its `data` payload.
pub async fn dispatch(gateway: &Gateway, action: Action, params: &Value) -> Result<Value, AppError> {
    let data = match action {
        Action::ListCourses => serde_json::to_value(gateway.list_courses().await?)?,
        Action::AddCourse => {
            let req: NewCourseRequest = params_as(params)?;
            serde_json::to_value(gateway.create_course(req).await?)?
        }
        Action::DeleteCourse => {
            let IdParams { id } = params_as::<IdParams>(params)?;
            gateway.delete_course(&id).await?;
            deleted(id)
        }
        Action::ListAssignments => {
            let query: AssignmentQuery = params_as(params)?;
            serde_json::to_value(gateway.list_assignments(query).await?)?
        }
        Action::GetAssignment => {
            let IdParams { id } = params_as::<IdParams>(params)?;
            serde_json::to_value(gateway.get_assignment(&id).await?)?
        }
        Action::AddAssignment => {
            let req: NewAssignmentRequest = params_as(params)?;
            serde_json::to_value(gateway.create_assignment(req).await?)?
        }
        Action::UpdateAssignment => {
            let IdParams { id } = params_as::<IdParams>(params)?;
            let patch: AssignmentPatch = params_as(params)?;
            serde_json::to_value(gateway.update_assignment(&id, patch).await?)?
        }
        Action::DeleteAssignment => {
            let IdParams { id } = params_as::<IdParams>(params)?;
            gateway.delete_assignment(&id).await?;
            deleted(id)
        }
        Action::GetReminders => {
            let reminders: Vec<HubReminder> = gateway
                .reminders()
                .await?
                .into_iter()
                .map(HubReminder::from)
                .collect();
            serde_json::to_value(reminders)?
        }
        Action::SnoozeReminder => {
            let IdParams { id } = params_as::<IdParams>(params)?;
            serde_json::to_value(gateway.snooze_reminder(&id).await?)?
        }
    };
    Ok(data)
}

fn failure(err: AppError) -> Response {
    err.log();
    let body = ActionResponse {
        success: false,
        data: None,
        error: Some(err.message()),
    };
    (err.status(), Json(body)).into_response()
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/execute", post(execute))
}

async fn execute(
    State(state): State<AppState>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return failure(AppError::Validation(rejection.body_text())),
    };

    let action = match request.action.parse::<Action>() {
        Ok(action) => action,
        Err(err) => return failure(err),
    };

    let params = match request.parameters {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    info!("execute {}", action);
    match dispatch(&state.gateway(), action, &params).await {
        Ok(data) => (
            StatusCode::OK,
            Json(ActionResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response(),
        Err(err) => failure(err),
    }
}
