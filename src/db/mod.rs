pub mod postgrest;
pub mod repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{
    Assignment, AssignmentPatch, AssignmentStatus, AssignmentType, Course, CourseColor,
};

pub use postgrest::{PostgrestConfig, PostgrestStore};
pub use repository::SqliteStore;

/// Validated course ready for insertion.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub code: String,
    pub color: CourseColor,
}

/// Validated assignment ready for insertion, reminder already resolved.
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub course_id: String,
    pub title: String,
    pub kind: AssignmentType,
    pub due_at: DateTime<Utc>,
    pub weight: Option<f64>,
    pub description: String,
    pub status: AssignmentStatus,
    pub remind_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub course_id: Option<String>,
    pub status: Option<AssignmentStatus>,
    /// Only assignments due at or after this instant.
    pub due_from: Option<DateTime<Utc>>,
}

/// Relational store holding courses and assignments.
///
/// Assignment reads always join the owning course and list results are
/// ordered by `due_at` ascending. Deleting a course removes its assignments.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;

    async fn list_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn insert_course(&self, course: NewCourse) -> Result<Course, AppError>;
    async fn delete_course(&self, id: &str) -> Result<(), AppError>;

    async fn list_assignments(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, AppError>;
    async fn find_assignment(&self, id: &str) -> Result<Option<Assignment>, AppError>;
    async fn insert_assignment(&self, assignment: NewAssignment) -> Result<Assignment, AppError>;
    async fn update_assignment(
        &self,
        id: &str,
        patch: &AssignmentPatch,
    ) -> Result<Option<Assignment>, AppError>;
    async fn delete_assignment(&self, id: &str) -> Result<(), AppError>;

    /// Pending assignments whose reminder time is set and not after `now`.
    async fn due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Assignment>, AppError>;
}
