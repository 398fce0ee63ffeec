//! Cleanup queue policy: error classification and retry/expiry decisions.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::telegram::TelegramApiError;

pub const DEFAULT_BATCH_LIMIT: u64 = 200;
pub const DEFAULT_LEASE_SECS: i64 = 120;
pub const DEFAULT_RETRY_DELAY_SECS: i64 = 60;
pub const DEFAULT_MAX_RETRY_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Lower-cased description fragments that mean the message can never be deleted.
const TERMINAL_DESCRIPTION_PATTERNS: &[&str] = &[
    "message to delete not found",
    "message can't be deleted",
    "chat not found",
    "bot was kicked",
    "forbidden",
];

/// Counters reported by one cleanup batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupStats {
    pub due: u32,
    pub claimed: u32,
    pub skipped_already_claimed: u32,
    pub successful_deletes: u32,
    pub transient_errors: u32,
    pub terminal_errors: u32,
    pub retry_scheduled: u32,
    pub dropped_expired: u32,
    pub queue_deleted: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupPolicy {
    pub batch_limit: u64,
    pub lease: Duration,
    pub retry_delay: Duration,
    pub max_retry_window: Duration,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_BATCH_LIMIT,
            lease: Duration::seconds(DEFAULT_LEASE_SECS),
            retry_delay: Duration::seconds(DEFAULT_RETRY_DELAY_SECS),
            max_retry_window: Duration::seconds(DEFAULT_MAX_RETRY_WINDOW_SECS),
        }
    }
}

impl CleanupPolicy {
    pub fn lease_until(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.lease
    }

    /// Decide what happens to an item whose delete failed transiently.
    pub fn after_transient_failure(
        &self,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> TransientResolution {
        if now - created_at > self.max_retry_window {
            TransientResolution::Expired
        } else {
            TransientResolution::RetryAt(now + self.retry_delay)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientResolution {
    /// Retry window exhausted; drop the item.
    Expired,
    RetryAt(DateTime<Utc>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteFailureKind {
    /// Retrying cannot succeed; remove the item.
    Terminal,
    /// May succeed later.
    Transient,
}

/// Classify a failed `deleteMessage` call.
///
/// Rate limits, server errors and failures without a status code are transient. 400 and
/// 403 are terminal, as is any description naming a known unrecoverable state. Other 4xx
/// codes are terminal; anything else defaults to transient.
pub fn classify_delete_error(err: &TelegramApiError) -> DeleteFailureKind {
    let code = match err.error_code {
        None => return DeleteFailureKind::Transient,
        Some(code) => code,
    };
    if code == 429 || code >= 500 {
        return DeleteFailureKind::Transient;
    }
    if code == 400 || code == 403 {
        return DeleteFailureKind::Terminal;
    }
    if let Some(description) = err.description.as_deref() {
        let description = description.to_lowercase();
        if TERMINAL_DESCRIPTION_PATTERNS
            .iter()
            .any(|pattern| description.contains(pattern))
        {
            return DeleteFailureKind::Terminal;
        }
    }
    if (400..500).contains(&code) {
        DeleteFailureKind::Terminal
    } else {
        DeleteFailureKind::Transient
    }
}
