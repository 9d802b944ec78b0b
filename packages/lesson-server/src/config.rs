use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{MqAppConfig, StorageBackend, StorageConfig};

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Lesson upload and paging limits.
#[derive(Debug, Deserialize, Clone)]
pub struct LessonConfig {
    /// Maximum upload size in bytes. Default: 1 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
    /// Accepted MIME types for uploads. Default: `["text/plain"]`.
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
    /// Report lessons owned by someone else as missing instead of forbidden.
    #[serde(default)]
    pub hide_foreign_lessons: bool,
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Characters per content page when the client does not ask for one.
    #[serde(default = "default_content_page_size")]
    pub content_page_size: u64,
}

fn default_max_upload_size() -> usize {
    1024 * 1024
}
fn default_allowed_content_types() -> Vec<String> {
    vec!["text/plain".into()]
}
fn default_page_size() -> u64 {
    20
}
fn default_max_page_size() -> u64 {
    100
}
fn default_content_page_size() -> u64 {
    1000
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            max_upload_size: default_max_upload_size(),
            allowed_content_types: default_allowed_content_types(),
            hide_foreign_lessons: false,
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            content_page_size: default_content_page_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub lessons: LessonConfig,
    #[serde(default)]
    pub mq: MqAppConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., LESSONS__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("LESSONS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
