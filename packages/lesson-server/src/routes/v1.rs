use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::lesson;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/lessons", lesson_routes(config))
}

fn lesson_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let collection = OpenApiRouter::new()
        .routes(routes!(lesson::create_lesson, lesson::list_lessons))
        .layer(lesson::upload_body_limit(config.lessons.max_upload_size));

    let item = OpenApiRouter::new()
        .routes(routes!(lesson::get_lesson, lesson::delete_lesson))
        .routes(routes!(lesson::get_lesson_content));

    collection.merge(item)
}
