use axum::{
    Router,
    routing::{get, post, put},
};

use tower::ServiceBuilder;

use gazette_core::health::healthz;
use gazette_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    communities::set_summary_notifications,
    cron::{run_daily_summaries, run_helper_cleanup},
    health::readyz,
    helper_messages::send_helper_message,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Scheduler triggers
        .route(
            "/cron/telegram-helper-cleanup",
            get(run_helper_cleanup).post(run_helper_cleanup),
        )
        .route(
            "/cron/summaries",
            get(run_daily_summaries).post(run_daily_summaries),
        )
        // Bot surface
        .route("/helper-messages", post(send_helper_message))
        .route(
            "/communities/{chat_id}/summary-notifications",
            put(set_summary_notifications),
        )
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
