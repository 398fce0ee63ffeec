use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use gazette_domain::id::{ChatId, MessageId};

use crate::domain::cleanup::{
    CleanupPolicy, CleanupStats, DeleteFailureKind, TransientResolution, classify_delete_error,
};
use crate::domain::repository::{CleanupQueueRepository, TelegramPort};
use crate::domain::telegram::TelegramApiError;
use crate::domain::types::CleanupQueueItem;
use crate::error::CronServiceError;

pub struct ScheduleHelperDeletionInput {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    /// Negative delays are treated as zero.
    pub delay: Duration,
    pub now: DateTime<Utc>,
}

/// Queue a helper message for deletion. Repeated calls create independent rows.
pub struct ScheduleHelperDeletionUseCase<Q>
where
    Q: CleanupQueueRepository,
{
    pub queue: Q,
}

impl<Q> ScheduleHelperDeletionUseCase<Q>
where
    Q: CleanupQueueRepository,
{
    pub async fn execute(
        &self,
        input: ScheduleHelperDeletionInput,
    ) -> Result<CleanupQueueItem, CronServiceError> {
        let delay = input.delay.max(Duration::zero());
        let item = CleanupQueueItem {
            id: Uuid::now_v7(),
            chat_id: input.chat_id,
            message_id: input.message_id,
            delete_after: input.now + delay,
            created_at: input.now,
        };
        self.queue.enqueue(&item).await?;
        debug!(
            queue_id = %item.id,
            chat_id = %item.chat_id,
            message_id = %item.message_id,
            delete_after = %item.delete_after,
            "helper message scheduled for deletion"
        );
        Ok(item)
    }
}

/// One invocation of the cleanup job.
pub struct RunCleanupBatchUseCase<Q, T>
where
    Q: CleanupQueueRepository,
    T: TelegramPort,
{
    pub queue: Q,
    pub telegram: T,
    pub policy: CleanupPolicy,
    /// Upper bound on each `deleteMessage` call.
    pub call_timeout: std::time::Duration,
}

impl<Q, T> RunCleanupBatchUseCase<Q, T>
where
    Q: CleanupQueueRepository,
    T: TelegramPort,
{
    /// Process due items oldest first. Only a failure to read the due set is an error;
    /// every per-item failure is folded into the returned stats.
    pub async fn execute(&self, now: DateTime<Utc>) -> Result<CleanupStats, CronServiceError> {
        let due = self.queue.find_due(now, self.policy.batch_limit).await?;
        let mut stats = CleanupStats {
            due: due.len() as u32,
            ..CleanupStats::default()
        };
        if due.is_empty() {
            return Ok(stats);
        }

        let lease_until = self.policy.lease_until(now);
        let mut resolved: Vec<Uuid> = Vec::new();

        for item in &due {
            match self.queue.try_claim(item.id, now, lease_until).await {
                Ok(true) => stats.claimed += 1,
                Ok(false) => {
                    stats.skipped_already_claimed += 1;
                    continue;
                }
                Err(e) => {
                    warn!(queue_id = %item.id, error = %e, "failed to claim cleanup item");
                    continue;
                }
            }

            let failure = match self.delete(item).await {
                Ok(()) => {
                    stats.successful_deletes += 1;
                    resolved.push(item.id);
                    continue;
                }
                Err(e) => e,
            };

            match classify_delete_error(&failure) {
                DeleteFailureKind::Terminal => {
                    stats.terminal_errors += 1;
                    resolved.push(item.id);
                    warn!(
                        queue_id = %item.id,
                        chat_id = %item.chat_id,
                        message_id = %item.message_id,
                        error = %failure,
                        "helper message delete failed terminally; dropping"
                    );
                }
                DeleteFailureKind::Transient => {
                    stats.transient_errors += 1;
                    match self.policy.after_transient_failure(item.created_at, now) {
                        TransientResolution::Expired => {
                            stats.dropped_expired += 1;
                            resolved.push(item.id);
                            warn!(
                                queue_id = %item.id,
                                chat_id = %item.chat_id,
                                message_id = %item.message_id,
                                created_at = %item.created_at,
                                error = %failure,
                                "helper message delete retry window expired; dropping"
                            );
                        }
                        TransientResolution::RetryAt(retry_at) => {
                            match self.queue.reschedule(item.id, retry_at).await {
                                Ok(()) => {
                                    stats.retry_scheduled += 1;
                                    warn!(
                                        queue_id = %item.id,
                                        chat_id = %item.chat_id,
                                        message_id = %item.message_id,
                                        retry_at = %retry_at,
                                        error = %failure,
                                        "helper message delete failed transiently; retrying"
                                    );
                                }
                                Err(e) => {
                                    // The lease still hides the item until it lapses.
                                    error!(queue_id = %item.id, error = %e, "failed to reschedule cleanup item");
                                }
                            }
                        }
                    }
                }
            }
        }

        if !resolved.is_empty() {
            match self.queue.delete_batch(&resolved).await {
                Ok(_) => stats.queue_deleted = resolved.len() as u32,
                Err(e) => {
                    error!(count = resolved.len(), error = %e, "failed to remove resolved cleanup items");
                }
            }
        }

        info!(
            due = stats.due,
            claimed = stats.claimed,
            skipped_already_claimed = stats.skipped_already_claimed,
            successful_deletes = stats.successful_deletes,
            transient_errors = stats.transient_errors,
            terminal_errors = stats.terminal_errors,
            retry_scheduled = stats.retry_scheduled,
            dropped_expired = stats.dropped_expired,
            queue_deleted = stats.queue_deleted,
            "helper message cleanup finished"
        );
        Ok(stats)
    }

    async fn delete(&self, item: &CleanupQueueItem) -> Result<(), TelegramApiError> {
        tokio::time::timeout(
            self.call_timeout,
            self.telegram.delete_message(item.chat_id, item.message_id),
        )
        .await
        .unwrap_or_else(|_| Err(TelegramApiError::timeout()))
    }
}
