use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. `*` allows any origin.
    pub allow_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Postgrest,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    #[serde(default)]
    pub postgrest_url: String,
    #[serde(default)]
    pub api_key: String,
}

/// Metadata served from `/info`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppInfo {
    pub title: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub homepage_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub store: StoreConfig,
    pub info: AppInfo,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            // Load from config/dontforget.toml
            .add_source(File::with_name("config/dontforget").required(false))
            // Override from environment (e.g., DONTFORGET__STORE__API_KEY)
            .add_source(Environment::with_prefix("DONTFORGET").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, without files or environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.allow_origins", vec!["*"])?
            .set_default("database.url", "sqlite://dontforget.db")?
            .set_default("database.max_connections", 5)?
            .set_default("store.backend", "sqlite")?
            .set_default("info.title", "DontForget")?
            .set_default(
                "info.description",
                "Track school assignment deadlines by course, with automatic 3-day reminders.",
            )?
            .set_default("info.version", env!("CARGO_PKG_VERSION"))?
            .set_default("info.author", "")?
            .set_default("info.homepage_url", "")
    }
}
