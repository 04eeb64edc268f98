use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dontforget::api;
use dontforget::config::{AppConfig, StoreBackend};
use dontforget::db::{PostgrestConfig, PostgrestStore, SqliteStore, Store};
use dontforget::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "dontforget=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let store: Arc<dyn Store> = match config.store.backend {
        StoreBackend::Sqlite => {
            info!("using sqlite store at {}", config.database.url);
            Arc::new(SqliteStore::connect(&config.database.url, config.database.max_connections).await?)
        }
        StoreBackend::Postgrest => {
            info!("using hosted store at {}", config.store.postgrest_url);
            Arc::new(PostgrestStore::new(PostgrestConfig {
                url: config.store.postgrest_url.clone(),
                api_key: config.store.api_key.clone(),
            })?)
        }
    };

    let state = AppState::new(store, config.info.clone());
    let app = api::app(state, &config.server);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
