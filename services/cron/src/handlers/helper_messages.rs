use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gazette_core::serde::to_rfc3339_ms;
use gazette_domain::id::{ChatId, MessageId};

use crate::auth::CronAuth;
use crate::domain::types::ChatType;
use crate::error::CronServiceError;
use crate::state::AppState;
use crate::usecase::cleanup::ScheduleHelperDeletionUseCase;
use crate::usecase::helper_message::{SendHelperMessageInput, SendHelperMessageUseCase};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendHelperMessageRequest {
    pub chat_id: ChatId,
    pub text: String,
    /// Seconds until deletion; defaults to the configured helper TTL.
    pub ttl_secs: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendHelperMessageResponse {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub chat_type: ChatType,
    #[serde(serialize_with = "serialize_optional_ms")]
    pub delete_after: Option<DateTime<Utc>>,
}

fn serialize_optional_ms<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match dt {
        Some(dt) => to_rfc3339_ms(dt, s),
        None => s.serialize_none(),
    }
}

pub async fn send_helper_message(
    _auth: CronAuth,
    State(state): State<AppState>,
    Json(body): Json<SendHelperMessageRequest>,
) -> Result<(StatusCode, Json<SendHelperMessageResponse>), CronServiceError> {
    let usecase = SendHelperMessageUseCase {
        telegram: state.telegram.clone(),
        communities: state.community_repo(),
        schedule: ScheduleHelperDeletionUseCase {
            queue: state.cleanup_queue_repo(),
        },
        ttl: state.config.helper_message_ttl(),
        call_timeout: state.config.external_call_timeout(),
    };
    let output = usecase
        .execute(SendHelperMessageInput {
            chat_id: body.chat_id,
            text: body.text,
            ttl: body.ttl_secs.map(chrono::Duration::seconds),
            now: Utc::now(),
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SendHelperMessageResponse {
            chat_id: output.sent.chat_id,
            message_id: output.sent.message_id,
            chat_type: output.sent.chat_type,
            delete_after: output.delete_after,
        }),
    ))
}
