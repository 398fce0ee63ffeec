use sea_orm::Database;
use tracing::info;

use gazette_core::config::Config;
use gazette_core::tracing::init_tracing;
use gazette_cron::config::CronConfig;
use gazette_cron::router::build_router;
use gazette_cron::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = CronConfig::from_env();
    info!(config = ?config, "cron service configuration loaded");
    if config.cron_secret.as_deref().is_none_or(str::is_empty) {
        tracing::warn!("CRON_SECRET is not set; cron routes will answer 500");
    }
    let port = config.cron_port;

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState::from_config(db, config).expect("failed to build HTTP clients");

    let router = build_router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("cron service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
