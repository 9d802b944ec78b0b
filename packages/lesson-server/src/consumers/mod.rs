pub mod lesson_deleted;

pub use lesson_deleted::consume_lesson_deletions;
