use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::StorageKey;

/// Emitted after a lesson's metadata has been deleted and committed.
/// Consumers remove the blob that the lesson's content pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonDeleted {
    pub lesson_id: Uuid,
    pub storage_key: StorageKey,
    pub owner_id: String,
    pub deleted_at: DateTime<Utc>,
}

impl LessonDeleted {
    pub fn new(lesson_id: Uuid, storage_key: StorageKey, owner_id: impl Into<String>) -> Self {
        Self {
            lesson_id,
            storage_key,
            owner_id: owner_id.into(),
            deleted_at: Utc::now(),
        }
    }
}
