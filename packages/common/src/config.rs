use std::path::PathBuf;

use serde::Deserialize;

/// Which blob store adapter to construct.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    Http,
    S3,
}

/// Blob storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Client-side timeout for remote stores, in seconds. Default: 10.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub filesystem: FilesystemStorageConfig,
    pub http: Option<HttpStorageConfig>,
    pub s3: Option<S3StorageConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemStorageConfig {
    /// Default: "./data/blobs".
    #[serde(default = "default_filesystem_path")]
    pub path: PathBuf,
    /// Largest blob accepted, in bytes. Default: 16 MiB.
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,
}

/// Remote file service, e.g. `http://localhost:8080/files`.
#[derive(Debug, Deserialize, Clone)]
pub struct HttpStorageConfig {
    pub base_url: String,
    /// Sent as `Authorization: Bearer ..` on every request when set.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3StorageConfig {
    pub bucket: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, R2, ...).
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    #[serde(default)]
    pub path_style: bool,
}

fn default_request_timeout_secs() -> u64 {
    10
}
fn default_filesystem_path() -> PathBuf {
    PathBuf::from("./data/blobs")
}
fn default_max_blob_size() -> u64 {
    16 * 1024 * 1024
}
fn default_s3_region() -> String {
    "us-east-1".into()
}

impl Default for FilesystemStorageConfig {
    fn default() -> Self {
        Self {
            path: default_filesystem_path(),
            max_blob_size: default_max_blob_size(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            request_timeout_secs: default_request_timeout_secs(),
            filesystem: FilesystemStorageConfig::default(),
            http: None,
            s3: None,
        }
    }
}

/// App-level MQ configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct MqAppConfig {
    /// Whether deletion events go through Redis. Default: false, in which
    /// case an in-process channel is used.
    #[serde(default)]
    pub enabled: bool,
    /// Redis connection URL. Default: "redis://localhost:6379".
    #[serde(default = "default_mq_url")]
    pub url: String,
    /// Connection pool size. Default: 5.
    #[serde(default = "default_mq_pool_size")]
    pub pool_size: u8,
    /// Queue carrying `LessonDeleted` events. Default: "lesson_deletions".
    #[serde(default = "default_deletion_queue_name")]
    pub deletion_queue_name: String,
}

fn default_mq_url() -> String {
    "redis://localhost:6379".into()
}
fn default_mq_pool_size() -> u8 {
    5
}
fn default_deletion_queue_name() -> String {
    "lesson_deletions".into()
}

impl Default for MqAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_mq_url(),
            pool_size: default_mq_pool_size(),
            deletion_queue_name: default_deletion_queue_name(),
        }
    }
}
