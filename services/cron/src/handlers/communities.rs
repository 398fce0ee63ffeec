use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use gazette_domain::id::ChatId;

use crate::auth::CronAuth;
use crate::error::CronServiceError;
use crate::state::AppState;
use crate::usecase::notifications::SetSummaryNotificationsUseCase;

#[derive(Deserialize)]
pub struct SummaryNotificationsRequest {
    pub enabled: bool,
}

pub async fn set_summary_notifications(
    _auth: CronAuth,
    State(state): State<AppState>,
    Path(chat_id): Path<i64>,
    Json(body): Json<SummaryNotificationsRequest>,
) -> Result<StatusCode, CronServiceError> {
    let usecase = SetSummaryNotificationsUseCase {
        communities: state.community_repo(),
    };
    usecase.execute(ChatId(chat_id), body.enabled).await?;
    Ok(StatusCode::NO_CONTENT)
}
