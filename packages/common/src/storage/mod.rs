mod error;
mod key;
mod traits;

pub mod filesystem;
#[cfg(feature = "http-storage")]
pub mod http;
#[cfg(feature = "object-storage")]
pub mod object;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{StorageBackend, StorageConfig};

pub use error::StorageError;
pub use key::{KeyError, StorageKey};
pub use traits::BlobStore;

/// Build the blob store selected by `config.backend`.
pub async fn open_blob_store(config: &StorageConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    match config.backend {
        StorageBackend::Filesystem => {
            let store = filesystem::FilesystemBlobStore::new(
                config.filesystem.path.clone(),
                config.filesystem.max_blob_size,
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "http-storage")]
        StorageBackend::Http => {
            let http = config
                .http
                .as_ref()
                .ok_or_else(|| StorageError::Config("storage.http section is required".into()))?;
            let mut store = http::HttpBlobStore::new(&http.base_url, timeout)?;
            if let Some(token) = &http.bearer_token {
                store = store.with_bearer_token(token);
            }
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .ok_or_else(|| StorageError::Config("storage.s3 section is required".into()))?;
            Ok(Arc::new(object::S3BlobStore::new(s3, timeout)?))
        }
        #[allow(unreachable_patterns)]
        other => {
            let _ = timeout;
            Err(StorageError::Config(format!(
                "storage backend {other:?} is not enabled in this build"
            )))
        }
    }
}
