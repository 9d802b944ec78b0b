//! Hand-off between a committed lesson deletion and removal of its blob.

pub mod local;
pub mod queue;

use async_trait::async_trait;
use common::LessonDeleted;
use common::storage::BlobStore;
use thiserror::Error;
use tracing::{error, info};

pub use local::{LocalDeletionQueue, spawn_blob_cleanup_worker};
pub use queue::MqDeletionPublisher;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("deletion channel is closed")]
    Closed,
    #[error("failed to publish deletion event: {0}")]
    Publish(String),
}

/// Sink for [`LessonDeleted`] events. Only called after the deletion has
/// been committed.
#[async_trait]
pub trait DeletionEvents: Send + Sync {
    async fn publish(&self, event: LessonDeleted) -> Result<(), EventError>;
}

/// Remove the blob a deleted lesson pointed at.
///
/// Never retried. An orphaned blob is left behind on failure.
pub async fn cleanup_blob(blobs: &dyn BlobStore, event: &LessonDeleted) -> bool {
    match blobs.delete(&event.storage_key).await {
        Ok(existed) => {
            info!(
                lesson_id = %event.lesson_id,
                storage_key = %event.storage_key,
                existed,
                "Deleted blob of removed lesson"
            );
            true
        }
        Err(e) => {
            error!(
                lesson_id = %event.lesson_id,
                storage_key = %event.storage_key,
                owner_id = %event.owner_id,
                error = %e,
                "Failed to delete blob of removed lesson"
            );
            false
        }
    }
}
