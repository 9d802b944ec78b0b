use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use common::storage::StorageKey;
use sea_orm::*;
use uuid::Uuid;

use super::{Content, Lesson, LessonPage, NewLesson};
use crate::entity::{content, lesson};

/// Lesson metadata store.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Persist a lesson together with its content in one transaction.
    async fn save(&self, new: NewLesson) -> Result<Lesson, DbErr>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lesson>, DbErr>;

    async fn find_by_id_and_owner(&self, id: Uuid, owner: &str) -> Result<Option<Lesson>, DbErr>;

    /// Zero-based page of `owner`'s lessons, newest first. A page past the
    /// end is empty.
    async fn find_all_by_owner(
        &self,
        owner: &str,
        page: u64,
        per_page: u64,
    ) -> Result<LessonPage, DbErr>;

    /// Remove a lesson and its content. Returns `false` if the lesson did not
    /// exist. Returns only after the removal has been committed.
    async fn delete(&self, id: Uuid) -> Result<bool, DbErr>;
}

#[derive(Clone)]
pub struct SeaOrmLessonRepository {
    db: DatabaseConnection,
}

impl SeaOrmLessonRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn attach_content(&self, model: lesson::Model) -> Result<Lesson, DbErr> {
        let content = content::Entity::find()
            .filter(content::Column::LessonId.eq(model.id))
            .one(&self.db)
            .await?;
        into_lesson(model, content)
    }
}

fn into_content(model: content::Model) -> Result<Content, DbErr> {
    let storage_key = StorageKey::new(model.storage_key).map_err(|e| {
        DbErr::Custom(format!("content {} has an invalid storage key: {e}", model.id))
    })?;
    let total_words = u64::try_from(model.total_words).map_err(|_| {
        DbErr::Custom(format!(
            "content {} has a negative word count: {}",
            model.id, model.total_words
        ))
    })?;

    Ok(Content {
        id: model.id,
        storage_key,
        total_words,
        created_at: model.created_at,
    })
}

fn into_lesson(model: lesson::Model, content: Option<content::Model>) -> Result<Lesson, DbErr> {
    Ok(Lesson {
        id: model.id,
        created_by: model.created_by,
        title: model.title,
        content: content.map(into_content).transpose()?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

#[async_trait]
impl LessonRepository for SeaOrmLessonRepository {
    async fn save(&self, new: NewLesson) -> Result<Lesson, DbErr> {
        let now = Utc::now();
        let lesson_id = Uuid::now_v7();
        let content_id = Uuid::now_v7();
        let total_words = i64::try_from(new.total_words)
            .map_err(|_| DbErr::Custom(format!("word count {} out of range", new.total_words)))?;

        let txn = self.db.begin().await?;

        lesson::Entity::insert(lesson::ActiveModel {
            id: Set(lesson_id),
            created_by: Set(new.created_by.clone()),
            title: Set(new.title.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .exec_without_returning(&txn)
        .await?;

        content::Entity::insert(content::ActiveModel {
            id: Set(content_id),
            lesson_id: Set(lesson_id),
            storage_key: Set(new.storage_key.as_str().to_owned()),
            total_words: Set(total_words),
            created_at: Set(now),
            ..Default::default()
        })
        .exec_without_returning(&txn)
        .await?;

        txn.commit().await?;

        Ok(Lesson {
            id: lesson_id,
            created_by: new.created_by,
            title: new.title,
            content: Some(Content {
                id: content_id,
                storage_key: new.storage_key,
                total_words: new.total_words,
                created_at: now,
            }),
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lesson>, DbErr> {
        match lesson::Entity::find_by_id(id).one(&self.db).await? {
            Some(model) => self.attach_content(model).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_by_id_and_owner(&self, id: Uuid, owner: &str) -> Result<Option<Lesson>, DbErr> {
        let model = lesson::Entity::find_by_id(id)
            .filter(lesson::Column::CreatedBy.eq(owner))
            .one(&self.db)
            .await?;

        match model {
            Some(model) => self.attach_content(model).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_all_by_owner(
        &self,
        owner: &str,
        page: u64,
        per_page: u64,
    ) -> Result<LessonPage, DbErr> {
        if per_page == 0 {
            return Err(DbErr::Custom("per_page must be positive".into()));
        }

        let select = lesson::Entity::find().filter(lesson::Column::CreatedBy.eq(owner));

        let total = select
            .clone()
            .paginate(&self.db, per_page)
            .num_items()
            .await?;
        let total_pages = total.div_ceil(per_page);

        // Postgres binds OFFSET/LIMIT as BIGINT; anything past the last row
        // is answered without a query.
        let Some(offset) = page
            .checked_mul(per_page)
            .filter(|&offset| offset < total && i64::try_from(offset).is_ok())
        else {
            return Ok(LessonPage {
                items: Vec::new(),
                page,
                per_page,
                total,
                total_pages,
            });
        };

        let models = select
            .order_by_desc(lesson::Column::CreatedAt)
            .order_by_desc(lesson::Column::Id)
            .offset(Some(offset))
            .limit(Some(std::cmp::Ord::min(per_page, total - offset)))
            .all(&self.db)
            .await?;

        let mut contents: HashMap<Uuid, content::Model> = if models.is_empty() {
            HashMap::new()
        } else {
            content::Entity::find()
                .filter(content::Column::LessonId.is_in(models.iter().map(|m| m.id)))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|c| (c.lesson_id, c))
                .collect()
        };

        let items = models
            .into_iter()
            .map(|m| {
                let content = contents.remove(&m.id);
                into_lesson(m, content)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LessonPage {
            items,
            page,
            per_page,
            total,
            total_pages,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let txn = self.db.begin().await?;

        content::Entity::delete_many()
            .filter(content::Column::LessonId.eq(id))
            .exec(&txn)
            .await?;
        let result = lesson::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }
}
