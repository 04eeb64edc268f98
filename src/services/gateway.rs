use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::db::{AssignmentFilter, NewAssignment, NewCourse, Store};
use crate::error::AppError;
use crate::models::{
    Assignment, AssignmentPatch, AssignmentQuery, AssignmentStatus, Course, NewAssignmentRequest,
    NewCourseRequest,
};
use crate::services::reminder;

/// Every course/assignment operation, shared by the REST routes and the
/// action dispatcher. Validates input and applies the reminder rules before
/// anything reaches the store.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn Store>,
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Gateway {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        self.store.list_courses().await
    }

    pub async fn create_course(&self, req: NewCourseRequest) -> Result<Course, AppError> {
        let name = required(req.name, "name")?;
        let course = NewCourse {
            name,
            code: req.code.map(|c| c.trim().to_string()).unwrap_or_default(),
            color: req.color.unwrap_or_default(),
        };
        let created = self.store.insert_course(course).await?;
        info!("created course {} ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn delete_course(&self, id: &str) -> Result<(), AppError> {
        let id = required(Some(id.to_string()), "id")?;
        self.store.delete_course(&id).await?;
        info!("deleted course {} and its assignments", id);
        Ok(())
    }

    pub async fn list_assignments(&self, query: AssignmentQuery) -> Result<Vec<Assignment>, AppError> {
        self.list_assignments_at(query, Utc::now()).await
    }

    pub async fn list_assignments_at(
        &self,
        query: AssignmentQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<Assignment>, AppError> {
        let filter = AssignmentFilter {
            course_id: non_empty(query.course_id),
            status: query.status,
            due_from: query.upcoming.then_some(now),
        };
        debug!("listing assignments with {:?}", filter);
        self.store.list_assignments(&filter).await
    }

    pub async fn get_assignment(&self, id: &str) -> Result<Assignment, AppError> {
        let id = required(Some(id.to_string()), "id")?;
        self.store
            .find_assignment(&id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_assignment(&self, req: NewAssignmentRequest) -> Result<Assignment, AppError> {
        let course_id = required(req.course_id, "course_id")?;
        let title = required(req.title, "title")?;
        let due_at = req
            .due_at
            .ok_or_else(|| AppError::Validation("due_at is required".to_string()))?;

        let assignment = NewAssignment {
            course_id,
            title,
            kind: req.kind.unwrap_or_default(),
            due_at,
            weight: req.weight,
            description: req.description.unwrap_or_default(),
            status: AssignmentStatus::Pending,
            remind_at: reminder::resolve_initial_reminder(req.remind_at, due_at),
        };
        let created = self.store.insert_assignment(assignment).await?;
        info!(
            "created assignment {} due {} (remind at {:?})",
            created.id, created.due_at, created.remind_at
        );
        Ok(created)
    }

    pub async fn update_assignment(
        &self,
        id: &str,
        patch: AssignmentPatch,
    ) -> Result<Assignment, AppError> {
        let id = required(Some(id.to_string()), "id")?;
        let mut patch = reminder::apply_status_transition(patch);
        if patch.title.is_some() {
            patch.title = Some(required(patch.title, "title")?);
        }

        let updated = self
            .store
            .update_assignment(&id, &patch)
            .await?
            .ok_or(AppError::NotFound)?;
        info!("updated assignment {} (status {})", updated.id, updated.status);
        Ok(updated)
    }

    pub async fn delete_assignment(&self, id: &str) -> Result<(), AppError> {
        let id = required(Some(id.to_string()), "id")?;
        self.store.delete_assignment(&id).await?;
        info!("deleted assignment {}", id);
        Ok(())
    }

    /// Pending assignments whose reminder time has arrived. Late ones are left out.
    pub async fn reminders(&self) -> Result<Vec<Assignment>, AppError> {
        self.store.due_reminders(Utc::now()).await
    }

    pub async fn snooze_reminder(&self, id: &str) -> Result<Assignment, AppError> {
        self.snooze_reminder_at(id, Utc::now()).await
    }

    pub async fn snooze_reminder_at(&self, id: &str, now: DateTime<Utc>) -> Result<Assignment, AppError> {
        let current = self.get_assignment(id).await?;
        let patch = AssignmentPatch {
            remind_at: Some(Some(reminder::snooze(current.remind_at, now))),
            ..Default::default()
        };
        let snoozed = self
            .store
            .update_assignment(&current.id, &patch)
            .await?
            .ok_or(AppError::NotFound)?;
        info!("snoozed assignment {} until {:?}", snoozed.id, snoozed.remind_at);
        Ok(snoozed)
    }
}
