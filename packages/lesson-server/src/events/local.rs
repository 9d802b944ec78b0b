use std::sync::Arc;

use async_trait::async_trait;
use common::LessonDeleted;
use common::storage::BlobStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::{DeletionEvents, EventError, cleanup_blob};

/// In-process deletion channel drained by [`spawn_blob_cleanup_worker`].
#[derive(Clone)]
pub struct LocalDeletionQueue {
    tx: mpsc::UnboundedSender<LessonDeleted>,
}

impl LocalDeletionQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LessonDeleted>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl DeletionEvents for LocalDeletionQueue {
    async fn publish(&self, event: LessonDeleted) -> Result<(), EventError> {
        self.tx.send(event).map_err(|_| EventError::Closed)
    }
}

/// Delete blobs for every event received until all senders are dropped.
pub fn spawn_blob_cleanup_worker(
    mut rx: mpsc::UnboundedReceiver<LessonDeleted>,
    blobs: Arc<dyn BlobStore>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting blob cleanup worker");
        while let Some(event) = rx.recv().await {
            cleanup_blob(blobs.as_ref(), &event).await;
        }
        info!("Blob cleanup worker stopped");
    })
}
