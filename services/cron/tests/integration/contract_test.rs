use axum::body::to_bytes;
use axum::response::IntoResponse;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use gazette_cron::domain::cleanup::CleanupStats;
use gazette_cron::domain::run_context::build_run_context;
use gazette_cron::domain::summary::{ErrorScope, ProcessingError, SummaryStats};
use gazette_cron::domain::types::ChatType;
use gazette_cron::error::CronServiceError;
use gazette_cron::handlers::cron::{CleanupResponse, SummariesResponse};
use gazette_cron::handlers::helper_messages::SendHelperMessageResponse;
use gazette_domain::id::{ChatId, CommunityId, MessageId, SummaryId};
use gazette_testing::fixture::Fixture;

async fn error_body(error: CronServiceError) -> Value {
    let response = error.into_response();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn should_match_empty_cleanup_contract() {
    let body = CleanupResponse {
        ok: true,
        stats: CleanupStats::default(),
    };
    Fixture::assert_matches(
        "contracts/http/cron/cleanup_empty.json",
        &serde_json::to_value(&body).unwrap(),
    );
}

#[test]
fn should_match_successful_summaries_contract() {
    let now = Utc.with_ymd_and_hms(2026, 6, 16, 9, 0, 0).unwrap();
    let body = SummariesResponse {
        ok: true,
        run: build_run_context(now, Duration::hours(24)),
        skipped: false,
        stats: SummaryStats {
            active_communities: 3,
            candidates: 1,
            processed: 1,
            generated: 1,
            existing_for_run: 1,
            skipped_not_enough_messages: 1,
            delivery_attempted: 1,
            delivery_succeeded: 1,
            ..SummaryStats::default()
        },
        errors: vec![],
    };
    Fixture::assert_matches(
        "contracts/http/cron/summaries_ok.json",
        &serde_json::to_value(&body).unwrap(),
    );
}

#[test]
fn should_match_partial_failure_summaries_contract() {
    let body = SummariesResponse {
        ok: false,
        run: build_run_context(Utc::now(), Duration::hours(24)),
        skipped: false,
        stats: SummaryStats {
            active_communities: 2,
            candidates: 2,
            processed: 2,
            generated: 2,
            delivery_attempted: 2,
            delivery_succeeded: 1,
            delivery_failed: 1,
            errors: 1,
            ..SummaryStats::default()
        },
        errors: vec![ProcessingError {
            scope: ErrorScope::Delivery,
            community_id: CommunityId(Uuid::new_v4()),
            chat_id: ChatId(-1002),
            summary_id: Some(SummaryId(Uuid::now_v7())),
            error: "Summary delivery rejected: not_activated".to_owned(),
        }],
    };
    Fixture::assert_matches(
        "contracts/http/cron/summaries_partial_failure.json",
        &serde_json::to_value(&body).unwrap(),
    );
}

#[test]
fn should_omit_summary_id_on_generation_errors() {
    let error = ProcessingError {
        scope: ErrorScope::Generation,
        community_id: CommunityId(Uuid::new_v4()),
        chat_id: ChatId(-1002),
        summary_id: None,
        error: "text generation failed: timeout".to_owned(),
    };
    let json = serde_json::to_value(&error).unwrap();
    assert_eq!(json["scope"], "generation");
    assert!(json.get("summaryId").is_none());
}

#[test]
fn should_match_scheduled_helper_message_contract() {
    let body = SendHelperMessageResponse {
        chat_id: ChatId(-1001),
        message_id: MessageId(42),
        chat_type: ChatType::Supergroup,
        delete_after: Some(Utc.with_ymd_and_hms(2026, 6, 16, 9, 1, 0).unwrap()),
    };
    Fixture::assert_matches(
        "contracts/http/cron/helper_message_scheduled.json",
        &serde_json::to_value(&body).unwrap(),
    );
}

#[tokio::test]
async fn should_match_unauthorized_contract() {
    let body = error_body(CronServiceError::Unauthorized).await;
    Fixture::assert_matches("contracts/http/cron/error_unauthorized.json", &body);
}

#[tokio::test]
async fn should_match_misconfigured_contract() {
    let body = error_body(CronServiceError::Misconfigured).await;
    Fixture::assert_matches("contracts/http/cron/error_misconfigured.json", &body);
}
