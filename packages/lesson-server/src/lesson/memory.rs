use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DbErr;
use uuid::Uuid;

use super::{Content, Lesson, LessonPage, LessonRepository, NewLesson};

/// Process-local lesson store for embedding and tests.
#[derive(Default)]
pub struct InMemoryLessonRepository {
    lessons: Mutex<Vec<Lesson>>,
}

impl InMemoryLessonRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a lesson as-is, including inconsistent ones without content.
    pub fn insert(&self, lesson: Lesson) -> Result<(), DbErr> {
        self.lock()?.push(lesson);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lessons.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Lesson>>, DbErr> {
        self.lessons
            .lock()
            .map_err(|_| DbErr::Custom("lesson store lock poisoned".into()))
    }
}

#[async_trait]
impl LessonRepository for InMemoryLessonRepository {
    async fn save(&self, new: NewLesson) -> Result<Lesson, DbErr> {
        let now = Utc::now();
        let lesson = Lesson {
            id: Uuid::now_v7(),
            created_by: new.created_by,
            title: new.title,
            content: Some(Content {
                id: Uuid::now_v7(),
                storage_key: new.storage_key,
                total_words: new.total_words,
                created_at: now,
            }),
            created_at: now,
            updated_at: now,
        };
        self.lock()?.push(lesson.clone());
        Ok(lesson)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Lesson>, DbErr> {
        Ok(self.lock()?.iter().find(|l| l.id == id).cloned())
    }

    async fn find_by_id_and_owner(&self, id: Uuid, owner: &str) -> Result<Option<Lesson>, DbErr> {
        Ok(self
            .lock()?
            .iter()
            .find(|l| l.id == id && l.is_owned_by(owner))
            .cloned())
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

        let mut owned: Vec<Lesson> = self
            .lock()?
            .iter()
            .filter(|l| l.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = owned.len() as u64;
        let skip = usize::try_from(page.saturating_mul(per_page)).unwrap_or(usize::MAX);
        let take = usize::try_from(per_page).unwrap_or(usize::MAX);
        let items = owned.into_iter().skip(skip).take(take).collect();

        Ok(LessonPage {
            items,
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let mut lessons = self.lock()?;
        let before = lessons.len();
        lessons.retain(|l| l.id != id);
        Ok(lessons.len() != before)
    }
}
