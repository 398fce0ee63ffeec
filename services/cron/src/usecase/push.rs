use tracing::{info, warn};

use crate::domain::push::{EXPO_BATCH_LIMIT, PushStats, summaries_ready_messages};
use crate::domain::repository::{PushSender, PushTokenRepository, SummariesReadyNotifier};
use crate::error::CronServiceError;

/// Push "summaries are ready" to every registered device, in Expo-sized batches.
/// A failed batch is logged and the remaining batches are still sent.
pub struct NotifySummariesReadyUseCase<R, P>
where
    R: PushTokenRepository,
    P: PushSender,
{
    pub tokens: R,
    pub sender: P,
}

impl<R, P> SummariesReadyNotifier for NotifySummariesReadyUseCase<R, P>
where
    R: PushTokenRepository,
    P: PushSender,
{
    async fn notify_summaries_ready(&self) -> Result<PushStats, CronServiceError> {
        let tokens = self.tokens.list_tokens().await?;
        let messages = summaries_ready_messages(&tokens);
        let mut stats = PushStats {
            recipients: messages.len() as u32,
            ..PushStats::default()
        };

        for batch in messages.chunks(EXPO_BATCH_LIMIT) {
            match self.sender.send_batch(batch).await {
                Ok(()) => stats.batches_sent += 1,
                Err(e) => {
                    stats.batches_failed += 1;
                    warn!(batch_size = batch.len(), error = %e.detail(), "push batch failed");
                }
            }
        }

        if stats.recipients > 0 {
            info!(
                recipients = stats.recipients,
                batches_sent = stats.batches_sent,
                batches_failed = stats.batches_failed,
                "summaries-ready push sent"
            );
        }
        Ok(stats)
    }
}
