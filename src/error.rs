use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::UnknownAction(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_)
            | AppError::Store(_)
            | AppError::Config(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Store failures carry the store's own message.
    pub fn message(&self) -> String {
        match self {
            AppError::Database(e) => e.to_string(),
            AppError::Store(msg) | AppError::Config(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Writes server-side failures to the log before they leave the process.
    pub fn log(&self) {
        match self {
            AppError::Database(e) => error!("database error: {}", e),
            AppError::Store(msg) => error!("store error: {}", msg),
            AppError::Config(msg) => error!("configuration error: {}", msg),
            AppError::Serialization(e) => error!("serialization error: {}", e),
            AppError::UnknownAction(action) => warn!("unknown action requested: {}", action),
            AppError::NotFound | AppError::Validation(_) => {}
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: self.message(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Validation("title is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnknownAction("fly".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Store("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(AppError::NotFound.message(), "Not found");
        assert_eq!(AppError::Validation("name is required".into()).message(), "name is required");
        assert_eq!(AppError::UnknownAction("fly".into()).message(), "Unknown action: fly");
        assert_eq!(AppError::Store("relation missing".into()).message(), "relation missing");
    }
}
