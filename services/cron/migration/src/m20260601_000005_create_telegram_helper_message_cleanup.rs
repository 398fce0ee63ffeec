use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TelegramHelperMessageCleanup::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TelegramHelperMessageCleanup::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TelegramHelperMessageCleanup::ChatId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TelegramHelperMessageCleanup::MessageId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TelegramHelperMessageCleanup::DeleteAfter)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TelegramHelperMessageCleanup::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(TelegramHelperMessageCleanup::Table)
                    .col(TelegramHelperMessageCleanup::DeleteAfter)
                    .name("idx_telegram_helper_message_cleanup_delete_after")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(TelegramHelperMessageCleanup::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum TelegramHelperMessageCleanup {
    Table,
    Id,
    ChatId,
    MessageId,
    DeleteAfter,
    CreatedAt,
}
