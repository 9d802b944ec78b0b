use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lesson::{ContentPage, Lesson};

pub use super::shared::Pagination;

/// Multipart form accepted by the upload endpoint.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct LessonUploadForm {
    /// Plain-text lesson file. The file name becomes the lesson title.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LessonResponse {
    #[schema(example = "01936f0e-7a4c-7b1e-9d0f-3c2a1b0e9f88")]
    pub id: String,
    #[schema(example = "abc.txt")]
    pub title: String,
    /// Word count of the stored text; null if the lesson's content is missing.
    #[schema(example = 2)]
    pub total_words: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Lesson> for LessonResponse {
    fn from(lesson: Lesson) -> Self {
        Self {
            id: lesson.id.to_string(),
            total_words: lesson.total_words(),
            title: lesson.title,
            created_at: lesson.created_at,
            updated_at: lesson.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LessonListResponse {
    pub data: Vec<LessonResponse>,
    pub pagination: Pagination,
}

/// Query parameters for lesson listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LessonListQuery {
    /// Zero-based page number.
    #[param(example = 0)]
    pub page: Option<i64>,
    #[param(example = 20)]
    pub per_page: Option<i64>,
}

/// Query parameters for reading lesson content.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LessonContentQuery {
    /// Zero-based page number.
    #[param(example = 0)]
    pub page: Option<i64>,
    /// Characters per page.
    #[param(example = 1000)]
    pub per_page: Option<i64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LessonContentResponse {
    /// Page text, trimmed. Never splits a word unless the word is very long.
    #[schema(example = "hello")]
    pub chunk: String,
    #[schema(example = 0)]
    pub page: usize,
    #[schema(example = 1000)]
    pub per_page: usize,
    /// Length of the whole text in characters.
    #[schema(example = 11)]
    pub total_length: usize,
    #[schema(example = 1)]
    pub total_pages: usize,
    pub is_last: bool,
    #[schema(example = 2)]
    pub total_words: u64,
}

impl From<ContentPage> for LessonContentResponse {
    fn from(content: ContentPage) -> Self {
        let page = content.page;
        Self {
            chunk: page.chunk,
            page: page.page_no,
            per_page: page.page_size,
            total_length: page.total_length,
            total_pages: page.total_pages,
            is_last: page.is_last,
            total_words: content.total_words,
        }
    }
}
