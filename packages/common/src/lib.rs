pub mod config;
pub mod event;
pub mod paginate;
pub mod storage;
pub mod text;

pub use config::{MqAppConfig, StorageBackend, StorageConfig};
pub use event::LessonDeleted;
pub use paginate::{PaginateError, TextPage, paginate};
