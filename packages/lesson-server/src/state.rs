use std::sync::Arc;

use crate::config::AppConfig;
use crate::lesson::LessonService;

#[derive(Clone)]
pub struct AppState {
    pub lessons: LessonService,
    pub config: Arc<AppConfig>,
}
