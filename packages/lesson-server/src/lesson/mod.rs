//! Lesson lifecycle: domain types, persistence and the coordinator that ties
//! blob storage, text analysis and metadata together.

mod access;
mod error;
pub mod memory;
pub mod repository;
pub mod service;

use chrono::{DateTime, Utc};
use common::TextPage;
use common::storage::StorageKey;
use uuid::Uuid;

pub use access::{AccessPolicy, Lookup};
pub use error::LessonError;
pub use memory::InMemoryLessonRepository;
pub use repository::{LessonRepository, SeaOrmLessonRepository};
pub use service::LessonService;

/// Stored text backing a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub id: Uuid,
    pub storage_key: StorageKey,
    pub total_words: u64,
    pub created_at: DateTime<Utc>,
}

/// A lesson's metadata. `content` is `None` only when the stored rows are
/// inconsistent; readers report that as [`LessonError::ContentMissing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: Uuid,
    pub created_by: String,
    pub title: String,
    pub content: Option<Content>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    pub fn total_words(&self) -> Option<u64> {
        self.content.as_ref().map(|c| c.total_words)
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.created_by == owner
    }
}

/// Everything needed to persist a freshly uploaded lesson.
#[derive(Debug, Clone)]
pub struct NewLesson {
    pub created_by: String,
    pub title: String,
    pub storage_key: StorageKey,
    pub total_words: u64,
}

/// One page of a requester's lessons, newest first.
#[derive(Debug, Clone)]
pub struct LessonPage {
    pub items: Vec<Lesson>,
    /// Zero-based page number.
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// A content page plus the lesson's precomputed word count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPage {
    pub page: TextPage,
    pub total_words: u64,
}
