use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{AssignmentFilter, NewAssignment, NewCourse, Store};
use crate::error::AppError;
use crate::models::{
    Assignment, AssignmentPatch, AssignmentStatus, AssignmentType, Course, CourseColor,
};

const ASSIGNMENT_SELECT: &str = r#"
    SELECT
        a.id, a.course_id, a.title, a.type, a.due_at, a.weight,
        a.description, a.status, a.remind_at, a.created_at,
        c.name AS course_name,
        c.code AS course_code,
        c.color AS course_color,
        c.created_at AS course_created_at
    FROM assignments a
    LEFT JOIN courses c ON c.id = a.course_id
"#;

const ASSIGNMENT_ORDER: &str = " ORDER BY a.due_at ASC, a.created_at ASC";

/// Assignment joined with its course, flattened the way SQLite returns it.
#[derive(Debug, FromRow)]
struct AssignmentRow {
    id: String,
    course_id: String,
    title: String,
    #[sqlx(rename = "type")]
    kind: AssignmentType,
    due_at: DateTime<Utc>,
    weight: Option<f64>,
    description: String,
    status: AssignmentStatus,
    remind_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    course_name: Option<String>,
    course_code: Option<String>,
    course_color: Option<CourseColor>,
    course_created_at: Option<DateTime<Utc>>,
}

impl From<AssignmentRow> for Assignment {
    fn from(row: AssignmentRow) -> Self {
        let course = match (row.course_name, row.course_created_at) {
            (Some(name), Some(created_at)) => Some(Course {
                id: row.course_id.clone(),
                name,
                code: row.course_code.unwrap_or_default(),
                color: row.course_color.unwrap_or_default(),
                created_at,
            }),
            _ => None,
        };

        Assignment {
            id: row.id,
            course_id: row.course_id,
            title: row.title,
            kind: row.kind,
            due_at: row.due_at,
            weight: row.weight,
            description: row.description,
            status: row.status,
            remind_at: row.remind_at,
            created_at: row.created_at,
            course,
        }
    }
}

/// Opens the pool and brings the schema up to date.
///
/// In-memory databases live as long as their connection, so they get a single
/// connection that is never recycled.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:");
    let mut pool_options = SqlitePoolOptions::new();
    pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        pool_options.max_connections(max_connections)
    };

    let pool = pool_options.connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("sqlite store ready at {}", database_url);

    Ok(pool)
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT id, name, code, color, created_at FROM courses ORDER BY name ASC",
    )
    .fetch_all(db)
    .await
}

pub async fn insert_course(db: &SqlitePool, req: NewCourse) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO courses (id, name, code, color, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&id)
    .bind(&req.name)
    .bind(&req.code)
    .bind(req.color)
    .bind(now)
    .execute(db)
    .await?;

    Ok(Course {
        id,
        name: req.name,
        code: req.code,
        color: req.color,
        created_at: now,
    })
}

pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_assignments(
    db: &SqlitePool,
    filter: &AssignmentFilter,
) -> Result<Vec<Assignment>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(ASSIGNMENT_SELECT);
    qb.push(" WHERE 1 = 1");
    if let Some(course_id) = &filter.course_id {
        qb.push(" AND a.course_id = ").push_bind(course_id.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND a.status = ").push_bind(status);
    }
    if let Some(from) = filter.due_from {
        qb.push(" AND a.due_at >= ").push_bind(from);
    }
    qb.push(ASSIGNMENT_ORDER);

    let rows = qb.build_query_as::<AssignmentRow>().fetch_all(db).await?;
    Ok(rows.into_iter().map(Assignment::from).collect())
}

pub async fn find_assignment_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Assignment>, sqlx::Error> {
    let sql = format!("{ASSIGNMENT_SELECT} WHERE a.id = ?1");
    let row = sqlx::query_as::<_, AssignmentRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row.map(Assignment::from))
}

pub async fn insert_assignment(
    db: &SqlitePool,
    req: NewAssignment,
) -> Result<Assignment, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO assignments
            (id, course_id, title, type, due_at, weight,
            description, status, remind_at, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&id)
    .bind(&req.course_id)
    .bind(&req.title)
    .bind(req.kind)
    .bind(req.due_at)
    .bind(req.weight)
    .bind(&req.description)
    .bind(req.status)
    .bind(req.remind_at)
    .bind(now)
    .execute(db)
    .await?;

    find_assignment_by_id(db, &id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn update_assignment(
    db: &SqlitePool,
    id: &str,
    patch: &AssignmentPatch,
) -> Result<Option<Assignment>, sqlx::Error> {
    if patch.is_empty() {
        return find_assignment_by_id(db, id).await;
    }

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE assignments SET ");
    let mut set = qb.separated(", ");
    if let Some(title) = &patch.title {
        set.push("title = ").push_bind_unseparated(title.clone());
    }
    if let Some(kind) = patch.kind {
        set.push("type = ").push_bind_unseparated(kind);
    }
    if let Some(due_at) = patch.due_at {
        set.push("due_at = ").push_bind_unseparated(due_at);
    }
    if let Some(weight) = patch.weight {
        set.push("weight = ").push_bind_unseparated(weight);
    }
    if let Some(description) = &patch.description {
        set.push("description = ").push_bind_unseparated(description.clone());
    }
    if let Some(status) = patch.status {
        set.push("status = ").push_bind_unseparated(status);
    }
    if let Some(remind_at) = patch.remind_at {
        set.push("remind_at = ").push_bind_unseparated(remind_at);
    }
    qb.push(" WHERE id = ").push_bind(id.to_string());

    let affected = qb.build().execute(db).await?.rows_affected();
    debug!("updated assignment {} ({} row)", id, affected);
    if affected == 0 {
        return Ok(None);
    }

    find_assignment_by_id(db, id).await
}

pub async fn delete_assignment(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assignments WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

pub async fn fetch_due_reminders(
    db: &SqlitePool,
    now: DateTime<Utc>,
) -> Result<Vec<Assignment>, sqlx::Error> {
    let sql = format!(
        "{ASSIGNMENT_SELECT} WHERE a.status = ?1 AND a.remind_at IS NOT NULL AND a.remind_at <= ?2{ASSIGNMENT_ORDER}"
    );
    let rows = sqlx::query_as::<_, AssignmentRow>(&sql)
        .bind(AssignmentStatus::Pending)
        .bind(now)
        .fetch_all(db)
        .await?;

    Ok(rows.into_iter().map(Assignment::from).collect())
}

/// [`Store`] backed by a local SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        Ok(Self::new(connect(database_url, max_connections).await?))
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(fetch_courses(&self.db).await?)
    }

    async fn insert_course(&self, course: NewCourse) -> Result<Course, AppError> {
        Ok(insert_course(&self.db, course).await?)
    }

    async fn delete_course(&self, id: &str) -> Result<(), AppError> {
        let removed = delete_course(&self.db, id).await?;
        debug!("delete course {}: removed={}", id, removed);
        Ok(())
    }

    async fn list_assignments(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, AppError> {
        Ok(fetch_assignments(&self.db, filter).await?)
    }

    async fn find_assignment(&self, id: &str) -> Result<Option<Assignment>, AppError> {
        Ok(find_assignment_by_id(&self.db, id).await?)
    }

    async fn insert_assignment(&self, assignment: NewAssignment) -> Result<Assignment, AppError> {
        Ok(insert_assignment(&self.db, assignment).await?)
    }

    async fn update_assignment(
        &self,
        id: &str,
        patch: &AssignmentPatch,
    ) -> Result<Option<Assignment>, AppError> {
        Ok(update_assignment(&self.db, id, patch).await?)
    }

    async fn delete_assignment(&self, id: &str) -> Result<(), AppError> {
        let removed = delete_assignment(&self.db, id).await?;
        debug!("delete assignment {}: removed={}", id, removed);
        Ok(())
    }

    async fn due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Assignment>, AppError> {
        Ok(fetch_due_reminders(&self.db, now).await?)
    }
}
