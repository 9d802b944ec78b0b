use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::error::StorageError;
use super::key::StorageKey;
use super::traits::BlobStore;

/// Filesystem-backed blob store.
///
/// Every upload gets a fresh key, so identical uploads land in distinct blobs.
/// Blobs are stored in a sharded directory layout:
/// `{base_path}/{first 2 key chars}/{remaining key chars}`
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Compute the filesystem path for a key, or `None` if this store could
    /// never have issued it.
    fn blob_path(&self, key: &StorageKey) -> Option<PathBuf> {
        let key = key.as_str();
        if key.len() <= 2 || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(self.base_path.join(&key[..2]).join(&key[2..]))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn store(&self, data: &[u8], filename: &str) -> Result<StorageKey, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let key = StorageKey::generate();
        let blob_path = self
            .blob_path(&key)
            .ok_or_else(|| StorageError::Config(format!("generated unusable key {key}")))?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(storage_key = %key, filename, size = data.len(), "Stored blob");
        Ok(key)
    }

    async fn fetch(&self, key: &StorageKey) -> Result<Vec<u8>, StorageError> {
        let blob_path = self
            .blob_path(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        match fs::read(&blob_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &StorageKey) -> Result<bool, StorageError> {
        let Some(blob_path) = self.blob_path(key) else {
            return Ok(false);
        };
        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
