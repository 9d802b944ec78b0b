use std::sync::Arc;

use common::LessonDeleted;
use common::storage::BlobStore;
use mq::{BrokerMessage, Mq};
use tracing::{error, info};

use crate::events::cleanup_blob;

/// Consume deletion events from the deletion queue and remove their blobs.
///
/// Every message is acknowledged, including those whose blob could not be
/// deleted; orphaned blobs are tolerated.
pub async fn consume_lesson_deletions(blobs: Arc<dyn BlobStore>, mq: Arc<Mq>, queue_name: String) {
    info!(queue = %queue_name, "Starting lesson deletion consumer");

    let result = mq
        .process_messages(
            &queue_name,
            None,
            None,
            move |message: BrokerMessage<LessonDeleted>| {
                let blobs = blobs.clone();
                async move {
                    cleanup_blob(blobs.as_ref(), &message.payload).await;
                    Ok(())
                }
            },
        )
        .await;

    if let Err(e) = result {
        error!(error = %e, "Lesson deletion consumer stopped unexpectedly");
    }
}
