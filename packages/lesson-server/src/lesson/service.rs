use std::sync::Arc;

use common::LessonDeleted;
use common::storage::{BlobStore, StorageError, StorageKey};
use common::{paginate, text};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    AccessPolicy, ContentPage, Lesson, LessonError, LessonPage, LessonRepository, Lookup,
    NewLesson,
};
use crate::events::DeletionEvents;

/// Coordinates lesson metadata, blob storage and deferred cleanup.
///
/// The owner identifier is always passed in explicitly; this type holds no
/// per-request state.
#[derive(Clone)]
pub struct LessonService {
    repo: Arc<dyn LessonRepository>,
    blobs: Arc<dyn BlobStore>,
    events: Arc<dyn DeletionEvents>,
    policy: AccessPolicy,
}

impl LessonService {
    pub fn new(
        repo: Arc<dyn LessonRepository>,
        blobs: Arc<dyn BlobStore>,
        events: Arc<dyn DeletionEvents>,
    ) -> Self {
        Self {
            repo,
            blobs,
            events,
            policy: AccessPolicy::default(),
        }
    }

    pub fn with_access_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Upload `data`, count its words and persist the lesson.
    ///
    /// If anything fails after the upload, the uploaded blob is deleted on a
    /// best-effort basis and the original error is returned.
    pub async fn create_lesson(
        &self,
        filename: &str,
        data: &[u8],
        owner: &str,
    ) -> Result<Lesson, LessonError> {
        if filename.trim().is_empty() {
            return Err(LessonError::InvalidArgument("file name is required".into()));
        }
        if data.is_empty() {
            return Err(LessonError::InvalidArgument("uploaded file is empty".into()));
        }

        let storage_key = self.blobs.store(data, filename).await?;

        match self.analyze_and_save(filename, data, owner, &storage_key).await {
            Ok(lesson) => {
                info!(
                    lesson_id = %lesson.id,
                    storage_key = %storage_key,
                    owner_id = %owner,
                    "Created lesson"
                );
                Ok(lesson)
            }
            Err(e) => {
                self.compensate_upload(&storage_key, &e).await;
                Err(e)
            }
        }
    }

    async fn analyze_and_save(
        &self,
        filename: &str,
        data: &[u8],
        owner: &str,
        storage_key: &StorageKey,
    ) -> Result<Lesson, LessonError> {
        let total_words = text::count_words(data)?;

        let lesson = self
            .repo
            .save(NewLesson {
                created_by: owner.to_owned(),
                title: filename.to_owned(),
                storage_key: storage_key.clone(),
                total_words,
            })
            .await?;

        Ok(lesson)
    }

    async fn compensate_upload(&self, storage_key: &StorageKey, cause: &LessonError) {
        match self.blobs.delete(storage_key).await {
            Ok(_) => info!(
                storage_key = %storage_key,
                error = %cause,
                "Deleted orphaned blob after failed lesson creation"
            ),
            Err(compensation) => warn!(
                storage_key = %storage_key,
                error = %cause,
                compensation_error = %compensation,
                "Compensating blob delete failed"
            ),
        }
    }

    async fn lookup(&self, id: Uuid, requester: &str) -> Result<Lesson, LessonError> {
        let lookup = match self.policy {
            AccessPolicy::RevealForeign => {
                let lesson = self.repo.find_by_id(id).await?;
                Lookup::resolve(lesson, requester, self.policy)
            }
            AccessPolicy::HideForeign => {
                let lesson = self.repo.find_by_id_and_owner(id, requester).await?;
                Lookup::resolve(lesson, requester, self.policy)
            }
        };
        lookup.into_result()
    }

    pub async fn get_lesson(&self, id: Uuid, requester: &str) -> Result<Lesson, LessonError> {
        self.lookup(id, requester).await
    }

    /// Zero-based page of the requester's own lessons.
    pub async fn list_lessons(
        &self,
        requester: &str,
        page: u64,
        per_page: u64,
    ) -> Result<LessonPage, LessonError> {
        if per_page == 0 {
            return Err(LessonError::InvalidArgument(
                "page size must be positive".into(),
            ));
        }
        Ok(self.repo.find_all_by_owner(requester, page, per_page).await?)
    }

    /// Delete the lesson's metadata, then hand its blob to the deletion
    /// channel. The blob is never touched before the metadata is gone.
    pub async fn delete_lesson(&self, id: Uuid, requester: &str) -> Result<(), LessonError> {
        let lesson = self.lookup(id, requester).await?;
        let storage_key = lesson.content.map(|c| c.storage_key);

        if !self.repo.delete(id).await? {
            return Err(LessonError::NotFound);
        }

        info!(lesson_id = %id, owner_id = %requester, "Deleted lesson");

        let Some(storage_key) = storage_key else {
            warn!(lesson_id = %id, "Deleted lesson had no content; no blob to clean up");
            return Ok(());
        };

        let event = LessonDeleted::new(id, storage_key, requester);
        if let Err(e) = self.events.publish(event.clone()).await {
            warn!(
                lesson_id = %id,
                storage_key = %event.storage_key,
                error = %e,
                "Failed to publish lesson deletion; blob will be orphaned"
            );
        }

        Ok(())
    }

    /// One word-boundary aware page of the lesson's stored text.
    pub async fn get_lesson_content(
        &self,
        id: Uuid,
        requester: &str,
        page_no: usize,
        page_size: usize,
    ) -> Result<ContentPage, LessonError> {
        if page_size == 0 {
            return Err(LessonError::InvalidArgument(
                "page size must be positive".into(),
            ));
        }

        let lesson = self.lookup(id, requester).await?;
        let content = lesson.content.ok_or(LessonError::ContentMissing)?;

        let bytes = self.blobs.fetch(&content.storage_key).await?;
        let text = String::from_utf8(bytes).map_err(|_| {
            StorageError::InvalidResponse(format!(
                "blob {} is not valid UTF-8",
                content.storage_key
            ))
        })?;

        Ok(ContentPage {
            page: paginate(&text, page_no, page_size)?,
            total_words: content.total_words,
        })
    }
}
