use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::telegram::TelegramApiError;

/// Cron service error variants.
#[derive(Debug, thiserror::Error)]
pub enum CronServiceError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("server misconfigured")]
    Misconfigured,
    #[error("community not found")]
    CommunityNotFound,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("text generation failed: {0}")]
    Generation(String),
    #[error(transparent)]
    Telegram(#[from] TelegramApiError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl CronServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Misconfigured => "MISCONFIGURED",
            Self::CommunityNotFound => "COMMUNITY_NOT_FOUND",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Generation(_) => "GENERATION_FAILED",
            Self::Telegram(_) => "TELEGRAM_API_ERROR",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Message including the cause chain of internal errors, for per-item error records
    /// returned to the authenticated scheduler.
    pub fn detail(&self) -> String {
        match self {
            Self::Internal(e) => format!("{e:#}"),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for CronServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::CommunityNotFound => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Generation(_) | Self::Telegram(_) => StatusCode::BAD_GATEWAY,
            Self::Misconfigured | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer records every status; only server-side faults get their cause logged.
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            Self::Misconfigured => {
                tracing::error!(kind = "MISCONFIGURED", "CRON_SECRET is not configured")
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
