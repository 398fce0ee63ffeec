use sea_orm::entity::prelude::*;

/// One digest per (community, trigger key). The pair is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "summaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub community_id: Uuid,
    pub chat_title: Option<String>,
    pub message_count: i32,
    pub from_message_id: Option<i64>,
    pub to_message_id: Option<i64>,
    /// `[{"title", "content", "sources"}]`
    pub topics: Json,
    pub oneliner: Option<String>,
    pub trigger_type: String,
    pub trigger_key: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::communities::Entity",
        from = "Column::CommunityId",
        to = "super::communities::Column::Id"
    )]
    Community,
}

impl Related<super::communities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Community.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
