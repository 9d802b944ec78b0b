use std::sync::Arc;

use async_trait::async_trait;
use common::LessonDeleted;
use mq::Mq;

use super::{DeletionEvents, EventError};

/// Publishes deletion events to the Redis-backed deletion queue.
pub struct MqDeletionPublisher {
    mq: Arc<Mq>,
    queue_name: String,
}

impl MqDeletionPublisher {
    pub fn new(mq: Arc<Mq>, queue_name: impl Into<String>) -> Self {
        Self {
            mq,
            queue_name: queue_name.into(),
        }
    }
}

#[async_trait]
impl DeletionEvents for MqDeletionPublisher {
    async fn publish(&self, event: LessonDeleted) -> Result<(), EventError> {
        self.mq
            .publish(&self.queue_name, None, &event, None)
            .await
            .map(|_| ())
            .map_err(|e| EventError::Publish(e.to_string()))
    }
}
