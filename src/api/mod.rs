pub mod action;
pub mod extract;
pub mod manifest;
pub mod rest;

use axum::http::{HeaderValue, Method, StatusCode};
use axum::{Router, extract::State, routing::get};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(rest::routes())
        .merge(action::routes())
        .merge(manifest::routes())
        .with_state(state)
}

/// Router with the CORS and request tracing layers used by the server.
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    router(state)
        .layer(cors(&server.allow_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.gateway().ping().await?;
    Ok(StatusCode::OK)
}
