use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PushTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PushTokens::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(PushTokens::Token)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PushTokens::TelegramUserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PushTokens::Platform).text().not_null())
                    .col(
                        ColumnDef::new(PushTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PushTokens::UpdatedAt)
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
                    .table(PushTokens::Table)
                    .col(PushTokens::TelegramUserId)
                    .name("idx_push_tokens_telegram_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PushTokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PushTokens {
    Table,
    Id,
    Token,
    TelegramUserId,
    Platform,
    CreatedAt,
    UpdatedAt,
}
