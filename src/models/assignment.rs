use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Course, blank_as_none, double_option, null_as_empty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AssignmentType {
    #[default]
    Assignment,
    Midterm,
    Exam,
    Quiz,
    Project,
    Lab,
    Other,
}

impl AssignmentType {
    pub const ALL: [AssignmentType; 7] = [
        AssignmentType::Assignment,
        AssignmentType::Midterm,
        AssignmentType::Exam,
        AssignmentType::Quiz,
        AssignmentType::Project,
        AssignmentType::Lab,
        AssignmentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentType::Assignment => "assignment",
            AssignmentType::Midterm => "midterm",
            AssignmentType::Exam => "exam",
            AssignmentType::Quiz => "quiz",
            AssignmentType::Project => "project",
            AssignmentType::Lab => "lab",
            AssignmentType::Other => "other",
        }
    }
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Submitted,
    Completed,
    Late,
}

impl AssignmentStatus {
    pub const ALL: [AssignmentStatus; 4] = [
        AssignmentStatus::Pending,
        AssignmentStatus::Submitted,
        AssignmentStatus::Completed,
        AssignmentStatus::Late,
    ];

    /// Submitted and completed work no longer needs reminding or a slot on the dashboard.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssignmentStatus::Submitted | AssignmentStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Late => "late",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub course_id: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: AssignmentType,
    pub due_at: DateTime<Utc>,
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub status: AssignmentStatus,
    pub remind_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Owning course, present when the read joined it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAssignmentRequest {
    pub course_id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AssignmentType>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub due_at: Option<DateTime<Utc>>,
    pub weight: Option<f64>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub remind_at: Option<Option<DateTime<Utc>>>,
}

/// Partial update of an assignment. Only these fields can change; any other key
/// in an incoming body is dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssignmentPatch {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AssignmentType>,
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub weight: Option<Option<f64>>,
    pub description: Option<String>,
    pub status: Option<AssignmentStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub remind_at: Option<Option<DateTime<Utc>>>,
}

impl AssignmentPatch {
    pub fn is_empty(&self) -> bool {
        *self == AssignmentPatch::default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentQuery {
    pub course_id: Option<String>,
    pub status: Option<AssignmentStatus>,
    #[serde(default)]
    pub upcoming: bool,
}
