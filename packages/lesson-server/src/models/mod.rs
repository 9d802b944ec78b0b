pub mod lesson;
pub mod shared;
