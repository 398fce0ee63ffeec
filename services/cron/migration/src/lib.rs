use sea_orm_migration::prelude::*;

mod m20260601_000001_create_users;
mod m20260601_000002_create_communities;
mod m20260601_000003_create_messages;
mod m20260601_000004_create_summaries;
mod m20260601_000005_create_telegram_helper_message_cleanup;
mod m20260601_000006_create_push_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_create_users::Migration),
            Box::new(m20260601_000002_create_communities::Migration),
            Box::new(m20260601_000003_create_messages::Migration),
            Box::new(m20260601_000004_create_summaries::Migration),
            Box::new(m20260601_000005_create_telegram_helper_message_cleanup::Migration),
            Box::new(m20260601_000006_create_push_tokens::Migration),
        ]
    }
}
