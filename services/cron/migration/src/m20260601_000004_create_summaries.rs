use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Summaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Summaries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Summaries::CommunityId).uuid().not_null())
                    .col(ColumnDef::new(Summaries::ChatTitle).string())
                    .col(ColumnDef::new(Summaries::MessageCount).integer().not_null())
                    .col(ColumnDef::new(Summaries::FromMessageId).big_integer())
                    .col(ColumnDef::new(Summaries::ToMessageId).big_integer())
                    .col(ColumnDef::new(Summaries::Topics).json_binary().not_null())
                    .col(ColumnDef::new(Summaries::Oneliner).text())
                    .col(ColumnDef::new(Summaries::TriggerType).string().not_null())
                    .col(ColumnDef::new(Summaries::TriggerKey).string().not_null())
                    .col(
                        ColumnDef::new(Summaries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Summaries::Table, Summaries::CommunityId)
                            .to(Communities::Table, Communities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Idempotency gate for generation: INSERT ... ON CONFLICT DO NOTHING targets this.
        manager
            .create_index(
                Index::create()
                    .table(Summaries::Table)
                    .col(Summaries::CommunityId)
                    .col(Summaries::TriggerKey)
                    .unique()
                    .name("uq_summaries_community_id_trigger_key")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Summaries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Summaries {
    Table,
    Id,
    CommunityId,
    ChatTitle,
    MessageCount,
    FromMessageId,
    ToMessageId,
    Topics,
    Oneliner,
    TriggerType,
    TriggerKey,
    CreatedAt,
}

#[derive(Iden)]
enum Communities {
    Table,
    Id,
}
