use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::open_blob_store;
use lesson_server::config::AppConfig;
use lesson_server::consumers::consume_lesson_deletions;
use lesson_server::database::init_db;
use lesson_server::events::{
    DeletionEvents, LocalDeletionQueue, MqDeletionPublisher, spawn_blob_cleanup_worker,
};
use lesson_server::lesson::{AccessPolicy, LessonService, SeaOrmLessonRepository};
use lesson_server::state::AppState;
use mq::{MqConfig, init_mq};
use tracing::{Level, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected and schema synced");

    let blobs = open_blob_store(&config.storage)
        .await
        .context("Failed to open blob store")?;
    info!(backend = ?config.storage.backend, "Blob store ready");

    let events: Arc<dyn DeletionEvents> = if config.mq.enabled {
        let mq = Arc::new(
            init_mq(MqConfig {
                url: config.mq.url.clone(),
                pool_size: config.mq.pool_size,
            })
            .await
            .context("Failed to connect to message queue")?,
        );
        info!(queue = %config.mq.deletion_queue_name, "Message queue connected");

        tokio::spawn(consume_lesson_deletions(
            blobs.clone(),
            mq.clone(),
            config.mq.deletion_queue_name.clone(),
        ));
        Arc::new(MqDeletionPublisher::new(
            mq,
            config.mq.deletion_queue_name.clone(),
        ))
    } else {
        let (queue, rx) = LocalDeletionQueue::new();
        spawn_blob_cleanup_worker(rx, blobs.clone());
        Arc::new(queue)
    };

    let lessons = LessonService::new(
        Arc::new(SeaOrmLessonRepository::new(db)),
        blobs,
        events,
    )
    .with_access_policy(AccessPolicy::from_hide_foreign(
        config.lessons.hide_foreign_lessons,
    ));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = lesson_server::build_router(AppState {
        lessons,
        config: Arc::new(config),
    });

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
