use sea_orm_migration::prelude::*;

use gazette_cron_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
