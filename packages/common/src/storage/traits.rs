use async_trait::async_trait;

use super::error::StorageError;
use super::key::StorageKey;

/// Remote byte storage addressed by opaque keys.
///
/// Implementations never retry; a failed call is reported once and the caller
/// decides whether the failure matters.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under a new key and return that key.
    async fn store(&self, data: &[u8], filename: &str) -> Result<StorageKey, StorageError>;

    /// Retrieve all bytes for a blob.
    async fn fetch(&self, key: &StorageKey) -> Result<Vec<u8>, StorageError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, key: &StorageKey) -> Result<bool, StorageError>;
}
