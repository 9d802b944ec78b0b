use common::storage::StorageError;
use common::text::TextError;
use common::PaginateError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LessonError {
    #[error("lesson not found")]
    NotFound,

    #[error("lesson belongs to another user")]
    Forbidden,

    #[error("lesson has no stored content")]
    ContentMissing,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl From<TextError> for LessonError {
    fn from(err: TextError) -> Self {
        LessonError::InvalidArgument(err.to_string())
    }
}

impl From<PaginateError> for LessonError {
    fn from(err: PaginateError) -> Self {
        LessonError::InvalidArgument(err.to_string())
    }
}
