use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub lesson_id: Uuid,
    #[sea_orm(belongs_to, from = "lesson_id", to = "id")]
    pub lesson: HasOne<super::lesson::Entity>,

    #[sea_orm(column_type = "Text")]
    pub storage_key: String,
    pub total_words: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
