use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{Assignment, AssignmentQuery, Course};
use crate::services::Gateway;
use crate::services::due::{self, Bucket, DueStats, Upcoming};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardItem {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub bucket: Option<Bucket>,
    pub due_label: String,
}

impl DashboardItem {
    fn new(assignment: Assignment, now: DateTime<Utc>) -> Self {
        Self {
            bucket: due::bucket(&assignment, now),
            due_label: due::format_due_label(assignment.due_at, now),
            assignment,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    pub assignment_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub reminders: Vec<Assignment>,
    pub stats: DueStats,
    #[serde(flatten)]
    pub upcoming: Upcoming<DashboardItem>,
    pub courses: Vec<CourseSummary>,
}

/// Builds the dashboard from records already fetched in `due_at` order.
pub fn summarize(
    assignments: Vec<Assignment>,
    courses: Vec<Course>,
    reminders: Vec<Assignment>,
    now: DateTime<Utc>,
) -> Dashboard {
    let stats = due::due_stats(&assignments, now);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for a in &assignments {
        *counts.entry(a.course_id.clone()).or_default() += 1;
    }
    let courses = courses
        .into_iter()
        .map(|course| CourseSummary {
            assignment_count: counts.get(&course.id).copied().unwrap_or(0),
            course,
        })
        .collect();

    let upcoming = due::group_upcoming(assignments, now).map(|a| DashboardItem::new(a, now));

    Dashboard {
        generated_at: now,
        reminders,
        stats,
        upcoming,
        courses,
    }
}

pub async fn load(gateway: &Gateway, now: DateTime<Utc>) -> Result<Dashboard, AppError> {
    let assignments = gateway
        .list_assignments_at(AssignmentQuery::default(), now)
        .await?;
    let courses = gateway.list_courses().await?;
    let reminders = gateway.reminders().await?;
    Ok(summarize(assignments, courses, reminders, now))
}
