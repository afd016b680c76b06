//! Application configuration.
//!
//! Settings are layered: compiled-in defaults, then an optional
//! `config/default.toml` (plus `config/<RUN_ENV>.toml`), then environment
//! variables prefixed `FORUM__` with `__` as the section separator, e.g.
//! `FORUM__COMMENT_SERVICE__API_KEY`. A `.env` file is honored for local
//! development.

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The remote comment-storage service this API fronts.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentServiceConfig {
    pub base_url: String,
    pub api_key: SecretString,
    pub timeout_secs: u64,
}

/// The account service used for batch profile lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileServiceConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Public base URL used when building pagination and topic links.
    pub base_url: String,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub comment_service: CommentServiceConfig,
    pub profile_service: ProfileServiceConfig,
    pub api: ApiConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            debug!("loaded .env file");
        }
        let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "default".to_string());
        let config = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000_i64)?
            .set_default("comment_service.base_url", "http://localhost:4567/")?
            .set_default("comment_service.api_key", "")?
            .set_default("comment_service.timeout_secs", 5_i64)?
            .set_default("profile_service.base_url", "http://localhost:8001/")?
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.default_page_size", 10_i64)?
            .set_default("api.max_page_size", 100_i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_env}")).required(false))
            .add_source(
                Environment::with_prefix("FORUM")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
