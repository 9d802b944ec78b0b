use std::time::Duration;

use async_trait::async_trait;
use ::s3::creds::Credentials;
use ::s3::{Bucket, Region};
use tracing::debug;
use uuid::Uuid;

use super::error::StorageError;
use super::key::StorageKey;
use super::traits::BlobStore;
use crate::config::S3StorageConfig;

/// S3-compatible object storage. Objects live under `lessons/{uuid}/{filename}`.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
}

impl S3BlobStore {
    pub fn new(config: &S3StorageConfig, timeout: Duration) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|e| StorageError::Config(format!("invalid S3 region: {e}")))?,
        };

        let credentials = Credentials::new(
            config.access_key.as_deref(),
            config.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(format!("invalid S3 credentials: {e}")))?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| StorageError::Config(format!("invalid S3 bucket: {e}")))?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }
        bucket.set_request_timeout(Some(timeout));

        Ok(Self { bucket })
    }

    fn object_key(filename: &str) -> Result<StorageKey, StorageError> {
        let name: String = filename
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let name = name.trim_start_matches('.');
        let name = if name.is_empty() { "content" } else { name };

        Ok(StorageKey::new(format!("lessons/{}/{name}", Uuid::now_v7()))?)
    }
}

fn check_status(status: u16, operation: &'static str) -> Result<(), StorageError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(StorageError::Status { status, operation })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn store(&self, data: &[u8], filename: &str) -> Result<StorageKey, StorageError> {
        let key = Self::object_key(filename)?;

        let response = self
            .bucket
            .put_object(key.as_str(), data)
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        check_status(response.status_code(), "upload")?;

        debug!(storage_key = %key, size = data.len(), "Uploaded object");
        Ok(key)
    }

    async fn fetch(&self, key: &StorageKey) -> Result<Vec<u8>, StorageError> {
        let response = self
            .bucket
            .get_object(key.as_str())
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        if response.status_code() == 404 {
            return Err(StorageError::NotFound(key.to_string()));
        }
        check_status(response.status_code(), "fetch")?;

        let bytes = response.bytes();
        if bytes.is_empty() {
            return Err(StorageError::InvalidResponse(format!(
                "empty object for key {key}"
            )));
        }
        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &StorageKey) -> Result<bool, StorageError> {
        let response = self
            .bucket
            .delete_object(key.as_str())
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        if response.status_code() == 404 {
            return Ok(false);
        }
        check_status(response.status_code(), "delete")?;
        Ok(true)
    }
}
