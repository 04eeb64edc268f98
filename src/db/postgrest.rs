//! Hosted store reached through a PostgREST endpoint (the REST layer Supabase exposes).

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::{AssignmentFilter, NewAssignment, NewCourse, Store};
use crate::error::AppError;
use crate::models::{Assignment, AssignmentPatch, AssignmentStatus, Course};

const ASSIGNMENT_SELECT: &str = "*,course:courses(*)";

/// Postgres `invalid_text_representation`, returned when an `id=eq.` filter is not a uuid.
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

#[derive(Clone, Debug)]
pub struct PostgrestConfig {
    /// Project URL, e.g. `https://abc.supabase.co`. `/rest/v1` is appended.
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

#[derive(Debug)]
struct StoreFailure {
    status: StatusCode,
    code: Option<String>,
    message: String,
}

impl StoreFailure {
    /// An id lookup that can never match, since no row has a malformed id.
    fn is_invalid_id(&self) -> bool {
        self.status == StatusCode::BAD_REQUEST
            && self.code.as_deref() == Some(INVALID_TEXT_REPRESENTATION)
    }
}

pub struct PostgrestStore {
    client: Client,
    config: PostgrestConfig,
}

impl PostgrestStore {
    pub fn new(config: PostgrestConfig) -> Result<Self, AppError> {
        if config.url.trim().is_empty() || config.api_key.trim().is_empty() {
            return Err(AppError::Config(
                "store.postgrest_url and store.api_key must be set".to_string(),
            ));
        }
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, table: &str, params: &[(&str, String)]) -> Result<Url, AppError> {
        build_url(&self.config.url, table, params)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", self.config.api_key.as_str())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    async fn fetch_assignment_rows(
        &self,
        params: Vec<(&str, String)>,
    ) -> Result<Vec<Assignment>, AppError> {
        let url = self.endpoint("assignments", &params)?;
        debug!("postgrest GET {}", url);
        read_json(self.request(Method::GET, url).send().await?).await
    }
}

fn build_url(base: &str, table: &str, params: &[(&str, String)]) -> Result<Url, AppError> {
    let raw = format!("{}/rest/v1/{}", base.trim_end_matches('/'), table);
    let mut url = Url::parse(&raw)
        .map_err(|e| AppError::Config(format!("Invalid store URL {}: {}", raw, e)))?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn assignment_filter_params(filter: &AssignmentFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", ASSIGNMENT_SELECT.to_string()),
        ("order", "due_at.asc".to_string()),
    ];
    if let Some(course_id) = &filter.course_id {
        params.push(("course_id", format!("eq.{}", course_id)));
    }
    if let Some(status) = filter.status {
        params.push(("status", format!("eq.{}", status)));
    }
    if let Some(from) = filter.due_from {
        params.push(("due_at", format!("gte.{}", timestamp(from))));
    }
    params
}

fn reminder_params(now: DateTime<Utc>) -> Vec<(&'static str, String)> {
    vec![
        ("select", ASSIGNMENT_SELECT.to_string()),
        ("status", format!("eq.{}", AssignmentStatus::Pending)),
        ("remind_at", "not.is.null".to_string()),
        ("remind_at", format!("lte.{}", timestamp(now))),
        ("order", "due_at.asc".to_string()),
    ]
}

/// JSON body for a PATCH carrying only the keys the patch sets.
fn patch_body(patch: &AssignmentPatch) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(title) = &patch.title {
        body.insert("title".into(), json!(title));
    }
    if let Some(kind) = patch.kind {
        body.insert("type".into(), json!(kind));
    }
    if let Some(due_at) = patch.due_at {
        body.insert("due_at".into(), json!(due_at));
    }
    if let Some(weight) = patch.weight {
        body.insert("weight".into(), json!(weight));
    }
    if let Some(description) = &patch.description {
        body.insert("description".into(), json!(description));
    }
    if let Some(status) = patch.status {
        body.insert("status".into(), json!(status));
    }
    if let Some(remind_at) = patch.remind_at {
        body.insert("remind_at".into(), json!(remind_at));
    }
    body
}

async fn read_failure(response: Response) -> StoreFailure {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<PostgrestErrorBody>(&body) {
        Ok(err) => StoreFailure {
            status,
            code: err.code,
            message: err.message,
        },
        Err(_) => StoreFailure {
            status,
            code: None,
            message: format!("Store error {}: {}", status, body),
        },
    }
}

async fn ensure_success(response: Response) -> Result<Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(AppError::Store(read_failure(response).await.message))
}

/// Like [`ensure_success`] for requests filtered by id; `None` when the id is malformed.
async fn ensure_success_by_id(response: Response) -> Result<Option<Response>, AppError> {
    if response.status().is_success() {
        return Ok(Some(response));
    }
    let failure = read_failure(response).await;
    if failure.is_invalid_id() {
        debug!("treating malformed id as missing: {}", failure.message);
        return Ok(None);
    }
    Err(AppError::Store(failure.message))
}

async fn first_row_by_id<T: DeserializeOwned>(response: Response) -> Result<Option<T>, AppError> {
    match ensure_success_by_id(response).await? {
        Some(response) => {
            let rows: Vec<T> = read_json(response).await?;
            Ok(rows.into_iter().next())
        }
        None => Ok(None),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let response = ensure_success(response).await?;
    let body = response.text().await?;
    serde_json::from_str::<T>(&body)
        .map_err(|e| AppError::Store(format!("Failed to parse store response: {}", e)))
}

fn single<T>(rows: Vec<T>) -> Result<T, AppError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::Store("Store returned no row".to_string()))
}

#[async_trait]
impl Store for PostgrestStore {
    async fn ping(&self) -> Result<(), AppError> {
        let url = self.endpoint("courses", &[("select", "id".into()), ("limit", "1".into())])?;
        ensure_success(self.request(Method::GET, url).send().await?).await?;
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let url = self.endpoint("courses", &[("select", "*".into()), ("order", "name.asc".into())])?;
        read_json(self.request(Method::GET, url).send().await?).await
    }

    async fn insert_course(&self, course: NewCourse) -> Result<Course, AppError> {
        let url = self.endpoint("courses", &[("select", "*".into())])?;
        let body = json!({
            "name": course.name,
            "code": course.code,
            "color": course.color,
        });
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;
        single(read_json(response).await?)
    }

    async fn delete_course(&self, id: &str) -> Result<(), AppError> {
        let url = self.endpoint("courses", &[("id", format!("eq.{}", id))])?;
        ensure_success_by_id(self.request(Method::DELETE, url).send().await?).await?;
        Ok(())
    }

    async fn list_assignments(&self, filter: &AssignmentFilter) -> Result<Vec<Assignment>, AppError> {
        self.fetch_assignment_rows(assignment_filter_params(filter)).await
    }

    async fn find_assignment(&self, id: &str) -> Result<Option<Assignment>, AppError> {
        let url = self.endpoint(
            "assignments",
            &[
                ("select", ASSIGNMENT_SELECT.to_string()),
                ("id", format!("eq.{}", id)),
            ],
        )?;
        debug!("postgrest GET {}", url);
        first_row_by_id(self.request(Method::GET, url).send().await?).await
    }

    async fn insert_assignment(&self, assignment: NewAssignment) -> Result<Assignment, AppError> {
        let url = self.endpoint("assignments", &[("select", ASSIGNMENT_SELECT.to_string())])?;
        let body = json!({
            "course_id": assignment.course_id,
            "title": assignment.title,
            "type": assignment.kind,
            "due_at": assignment.due_at,
            "weight": assignment.weight,
            "description": assignment.description,
            "status": assignment.status,
            "remind_at": assignment.remind_at,
        });
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;
        single(read_json(response).await?)
    }

    async fn update_assignment(
        &self,
        id: &str,
        patch: &AssignmentPatch,
    ) -> Result<Option<Assignment>, AppError> {
        if patch.is_empty() {
            return self.find_assignment(id).await;
        }
        let url = self.endpoint(
            "assignments",
            &[
                ("id", format!("eq.{}", id)),
                ("select", ASSIGNMENT_SELECT.to_string()),
            ],
        )?;
        let response = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(&patch_body(patch))
            .send()
            .await?;
        first_row_by_id(response).await
    }

    async fn delete_assignment(&self, id: &str) -> Result<(), AppError> {
        let url = self.endpoint("assignments", &[("id", format!("eq.{}", id))])?;
        ensure_success_by_id(self.request(Method::DELETE, url).send().await?).await?;
        Ok(())
    }

    async fn due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Assignment>, AppError> {
        self.fetch_assignment_rows(reminder_params(now)).await
    }
}
