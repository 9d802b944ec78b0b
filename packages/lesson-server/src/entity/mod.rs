pub mod content;
pub mod lesson;
