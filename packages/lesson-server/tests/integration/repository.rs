use std::time::Duration;

use ::common::storage::StorageKey;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};
use uuid::Uuid;

use lesson_server::entity::{content, lesson};
use lesson_server::lesson::{LessonRepository, NewLesson, SeaOrmLessonRepository};

use crate::common::fresh_database;

fn new_lesson(owner: &str, title: &str, key: &str, words: u64) -> NewLesson {
    NewLesson {
        created_by: owner.to_string(),
        title: title.to_string(),
        storage_key: StorageKey::new(key).unwrap(),
        total_words: words,
    }
}

async fn setup() -> (DatabaseConnection, SeaOrmLessonRepository) {
    let db = fresh_database().await;
    (db.clone(), SeaOrmLessonRepository::new(db))
}

async fn lesson_rows(db: &DatabaseConnection) -> u64 {
    lesson::Entity::find().count(db).await.unwrap()
}

async fn content_rows_for(db: &DatabaseConnection, lesson_id: Uuid) -> u64 {
    content::Entity::find()
        .filter(content::Column::LessonId.eq(lesson_id))
        .count(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn saved_lessons_are_found_with_their_content() {
    let (db, repo) = setup().await;

    let saved = repo
        .save(new_lesson("alice", "notes.txt", "0193abcd", 42))
        .await
        .unwrap();
    assert_eq!(lesson_rows(&db).await, 1);
    assert_eq!(content_rows_for(&db, saved.id).await, 1);

    let found = repo.find_by_id(saved.id).await.unwrap().unwrap();
    assert_eq!(found.id, saved.id);
    assert_eq!(found.created_by, "alice");
    assert_eq!(found.title, "notes.txt");
    let content = found.content.unwrap();
    assert_eq!(content.storage_key.as_str(), "0193abcd");
    assert_eq!(content.total_words, 42);

    assert!(
        repo.find_by_id_and_owner(saved.id, "alice")
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        repo.find_by_id_and_owner(saved.id, "bob")
            .await
            .unwrap()
            .is_none()
    );
    assert!(repo.find_by_id(Uuid::now_v7()).await.unwrap().is_none());
}

#[tokio::test]
async fn listing_is_owner_scoped_newest_first_and_tolerates_deep_pages() {
    let (_db, repo) = setup().await;

    let mut ids = Vec::new();
    for i in 0..3 {
        let lesson = repo
            .save(new_lesson("alice", &format!("l{i}.txt"), &format!("key{i}"), i))
            .await
            .unwrap();
        ids.push(lesson.id);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    repo.save(new_lesson("bob", "b.txt", "keyb", 1))
        .await
        .unwrap();

    let first = repo.find_all_by_owner("alice", 0, 2).await.unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.total_pages, 2);
    let first_ids: Vec<_> = first.items.iter().map(|l| l.id).collect();
    assert_eq!(first_ids, vec![ids[2], ids[1]]);
    assert!(first.items.iter().all(|l| l.content.is_some()));

    let second = repo.find_all_by_owner("alice", 1, 2).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].id, ids[0]);

    let past_end = repo.find_all_by_owner("alice", 5, 2).await.unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total, 3);

    let deep = repo
        .find_all_by_owner("alice", 100_000_000_000_000_000, 100)
        .await
        .unwrap();
    assert!(deep.items.is_empty());
    assert_eq!(deep.total, 3);

    let huge = repo
        .find_all_by_owner("alice", 0, u64::MAX)
        .await
        .unwrap();
    assert_eq!(huge.items.len(), 3);
    assert_eq!(huge.total_pages, 1);

    let nobody = repo.find_all_by_owner("carol", 0, 10).await.unwrap();
    assert_eq!(nobody.total, 0);
    assert!(nobody.items.is_empty());
}

#[tokio::test]
async fn delete_removes_both_rows() {
    let (db, repo) = setup().await;

    let kept = repo
        .save(new_lesson("alice", "keep.txt", "keep", 1))
        .await
        .unwrap();
    let gone = repo
        .save(new_lesson("alice", "gone.txt", "gone", 2))
        .await
        .unwrap();

    assert!(repo.delete(gone.id).await.unwrap());
    assert!(repo.find_by_id(gone.id).await.unwrap().is_none());
    assert_eq!(content_rows_for(&db, gone.id).await, 0);

    assert!(!repo.delete(gone.id).await.unwrap());

    assert_eq!(lesson_rows(&db).await, 1);
    assert_eq!(content_rows_for(&db, kept.id).await, 1);
}

#[tokio::test]
async fn failed_content_insert_rolls_back_the_lesson() {
    let (db, repo) = setup().await;
    db.execute_unprepared(
        "ALTER TABLE \"content\" ADD CONSTRAINT storage_key_not_rejected \
         CHECK (storage_key <> 'rejected')",
    )
    .await
    .unwrap();

    let result = repo
        .save(new_lesson("alice", "broken.txt", "rejected", 3))
        .await;
    assert!(result.is_err());

    assert_eq!(lesson_rows(&db).await, 0);
    assert_eq!(content::Entity::find().count(&db).await.unwrap(), 0);

    repo.save(new_lesson("alice", "fine.txt", "accepted", 3))
        .await
        .unwrap();
    assert_eq!(lesson_rows(&db).await, 1);
}
