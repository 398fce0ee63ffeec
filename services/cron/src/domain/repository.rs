#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use gazette_domain::id::{ChatId, CommunityId, MessageId, SummaryId};

use crate::domain::push::{PushMessage, PushStats};
use crate::domain::run_context::SummaryRunContext;
use crate::domain::summary::{DeliveryResult, GenerateOutcome, InsertOutcome};
use crate::domain::telegram::TelegramApiError;
use crate::domain::types::{
    ChatMessage, CleanupQueueItem, Community, SentMessage, Summary, SummaryWithCommunity,
};
use crate::error::CronServiceError;

/// Lease-based queue of helper messages awaiting deletion.
pub trait CleanupQueueRepository: Send + Sync {
    async fn enqueue(&self, item: &CleanupQueueItem) -> Result<(), CronServiceError>;

    /// Up to `limit` items with `delete_after <= now`, oldest `delete_after` first.
    async fn find_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<CleanupQueueItem>, CronServiceError>;

    /// Atomically move `delete_after` to `lease_until` if it is still `<= now`.
    /// Returns `false` when another worker claimed the item first.
    async fn try_claim(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<bool, CronServiceError>;

    async fn reschedule(
        &self,
        id: Uuid,
        delete_after: DateTime<Utc>,
    ) -> Result<(), CronServiceError>;

    /// Remove resolved items in one statement. Returns the number of rows removed.
    async fn delete_batch(&self, ids: &[Uuid]) -> Result<u64, CronServiceError>;
}

pub trait CommunityRepository: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Community>, CronServiceError>;

    async fn find_by_chat_id(&self, chat_id: ChatId)
    -> Result<Option<Community>, CronServiceError>;

    /// Returns `false` if no community has this chat id.
    async fn set_summary_notifications(
        &self,
        chat_id: ChatId,
        enabled: bool,
    ) -> Result<bool, CronServiceError>;
}

pub trait MessageRepository: Send + Sync {
    /// Messages with `start <= created_at <= end`.
    async fn count_in_window(
        &self,
        community_id: CommunityId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, CronServiceError>;

    /// Same window as `count_in_window`, ordered by Telegram message id.
    async fn list_in_window(
        &self,
        community_id: CommunityId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ChatMessage>, CronServiceError>;
}

pub trait SummaryRepository: Send + Sync {
    async fn find_for_trigger(
        &self,
        community_id: CommunityId,
        trigger_key: &str,
    ) -> Result<Option<Summary>, CronServiceError>;

    /// Insert unless a summary for (community, trigger key) already exists.
    async fn insert_if_absent(&self, summary: &Summary) -> Result<InsertOutcome, CronServiceError>;

    async fn find_with_community(
        &self,
        id: SummaryId,
    ) -> Result<Option<SummaryWithCommunity>, CronServiceError>;
}

/// Telegram Bot API operations the jobs depend on.
pub trait TelegramPort: Send + Sync {
    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TelegramApiError>;

    /// Send HTML-formatted text with link previews disabled.
    async fn send_message(&self, chat_id: ChatId, text: &str)
    -> Result<SentMessage, TelegramApiError>;

    async fn forward_message(
        &self,
        to_chat_id: ChatId,
        from_chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<MessageId, TelegramApiError>;
}

/// Chat-completion backend used to write summaries.
pub trait TextGenerator: Send + Sync {
    /// Returns the assistant message content. Backend failures map to
    /// `CronServiceError::Generation`.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, CronServiceError>;
}

/// Produce or fetch the single summary for (community, run).
pub trait SummaryGeneration: Send + Sync {
    async fn generate_or_get(
        &self,
        community: &Community,
        run: &SummaryRunContext,
    ) -> Result<GenerateOutcome, CronServiceError>;
}

/// Send a stored summary to its community chat.
pub trait SummaryDelivery: Send + Sync {
    async fn deliver(&self, summary_id: SummaryId) -> Result<DeliveryResult, CronServiceError>;
}

pub trait PushTokenRepository: Send + Sync {
    /// Every registered push token.
    async fn list_tokens(&self) -> Result<Vec<String>, CronServiceError>;
}

/// Mobile push delivery backend.
pub trait PushSender: Send + Sync {
    /// Send one batch of at most `EXPO_BATCH_LIMIT` messages.
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<(), CronServiceError>;
}

/// Tell app users that a summary run has finished.
pub trait SummariesReadyNotifier: Send + Sync {
    async fn notify_summaries_ready(&self) -> Result<PushStats, CronServiceError>;
}
