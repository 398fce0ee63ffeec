use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use gazette_domain::id::ChatId;

use crate::domain::repository::{CleanupQueueRepository, CommunityRepository, TelegramPort};
use crate::domain::telegram::TelegramApiError;
use crate::domain::types::SentMessage;
use crate::error::CronServiceError;
use crate::usecase::cleanup::{ScheduleHelperDeletionInput, ScheduleHelperDeletionUseCase};

pub struct SendHelperMessageInput {
    pub chat_id: ChatId,
    pub text: String,
    /// Overrides the configured helper TTL.
    pub ttl: Option<Duration>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendHelperMessageOutput {
    pub sent: SentMessage,
    pub delete_after: Option<DateTime<Utc>>,
}

/// Send an ephemeral helper message. In tracked group chats the message is queued for
/// deletion; a queueing failure never fails the send.
pub struct SendHelperMessageUseCase<T, C, Q>
where
    T: TelegramPort,
    C: CommunityRepository,
    Q: CleanupQueueRepository,
{
    pub telegram: T,
    pub communities: C,
    pub schedule: ScheduleHelperDeletionUseCase<Q>,
    pub ttl: Duration,
    pub call_timeout: std::time::Duration,
}

impl<T, C, Q> SendHelperMessageUseCase<T, C, Q>
where
    T: TelegramPort,
    C: CommunityRepository,
    Q: CleanupQueueRepository,
{
    pub async fn execute(
        &self,
        input: SendHelperMessageInput,
    ) -> Result<SendHelperMessageOutput, CronServiceError> {
        if input.text.trim().is_empty() {
            return Err(CronServiceError::InvalidRequest(
                "text must not be empty".to_owned(),
            ));
        }

        let sent = tokio::time::timeout(
            self.call_timeout,
            self.telegram.send_message(input.chat_id, &input.text),
        )
        .await
        .unwrap_or_else(|_| Err(TelegramApiError::timeout()))?;

        if !sent.chat_type.is_community() {
            return Ok(SendHelperMessageOutput {
                sent,
                delete_after: None,
            });
        }

        match self.communities.find_by_chat_id(sent.chat_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!(chat_id = %sent.chat_id, "chat is not a tracked community; no cleanup");
                return Ok(SendHelperMessageOutput {
                    sent,
                    delete_after: None,
                });
            }
            Err(e) => {
                warn!(chat_id = %sent.chat_id, error = %e, "community lookup failed; no cleanup");
                return Ok(SendHelperMessageOutput {
                    sent,
                    delete_after: None,
                });
            }
        }

        let scheduled = self
            .schedule
            .execute(ScheduleHelperDeletionInput {
                chat_id: sent.chat_id,
                message_id: sent.message_id,
                delay: input.ttl.unwrap_or(self.ttl),
                now: input.now,
            })
            .await;

        let delete_after = match scheduled {
            Ok(item) => Some(item.delete_after),
            Err(e) => {
                warn!(
                    chat_id = %sent.chat_id,
                    message_id = %sent.message_id,
                    error = %e,
                    "failed to schedule helper message deletion"
                );
                None
            }
        };

        Ok(SendHelperMessageOutput { sent, delete_after })
    }
}
