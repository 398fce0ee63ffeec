use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;

use crate::auth::CronAuth;
use crate::domain::cleanup::CleanupStats;
use crate::domain::run_context::{SummaryRunContext, build_run_context};
use crate::domain::summary::{ProcessingError, SummaryStats};
use crate::error::CronServiceError;
use crate::state::AppState;
use crate::usecase::cleanup::RunCleanupBatchUseCase;
use crate::usecase::summary_delivery::DeliverSummaryUseCase;
use crate::usecase::summary_generate::GenerateSummaryUseCase;
use crate::usecase::summary_run::RunDailySummariesUseCase;

#[derive(Serialize)]
pub struct CleanupResponse {
    pub ok: bool,
    pub stats: CleanupStats,
}

#[derive(Serialize)]
pub struct SummariesResponse {
    pub ok: bool,
    pub run: SummaryRunContext,
    pub skipped: bool,
    pub stats: SummaryStats,
    pub errors: Vec<ProcessingError>,
}

pub async fn run_helper_cleanup(
    _auth: CronAuth,
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, CronServiceError> {
    let usecase = RunCleanupBatchUseCase {
        queue: state.cleanup_queue_repo(),
        telegram: state.telegram.clone(),
        policy: state.config.cleanup_policy(),
        call_timeout: state.config.external_call_timeout(),
    };
    let stats = usecase.execute(Utc::now()).await?;
    Ok(Json(CleanupResponse { ok: true, stats }))
}

/// 200 when every community succeeded, 500 with the same body otherwise.
pub async fn run_daily_summaries(
    _auth: CronAuth,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SummariesResponse>), CronServiceError> {
    let config = &state.config;
    let run = build_run_context(Utc::now(), config.summary_interval());

    let usecase = RunDailySummariesUseCase {
        communities: state.community_repo(),
        messages: state.message_repo(),
        summaries: state.summary_repo(),
        generator: GenerateSummaryUseCase {
            messages: state.message_repo(),
            summaries: state.summary_repo(),
            generator: state.llm.clone(),
            min_messages: config.summary_min_messages,
            call_timeout: config.external_call_timeout(),
        },
        delivery: DeliverSummaryUseCase {
            summaries: state.summary_repo(),
            telegram: state.telegram.clone(),
            qc_chat_id: config.qc_chat_id(),
            call_timeout: config.external_call_timeout(),
        },
        push: state.summaries_ready_notifier(),
        min_messages: config.summary_min_messages,
        concurrency: config.summary_concurrency,
    };
    let report = usecase.execute(&run).await?;

    let ok = report.ok();
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((
        status,
        Json(SummariesResponse {
            ok,
            run,
            skipped: false,
            stats: report.stats,
            errors: report.errors,
        }),
    ))
}
