use tracing::{info, warn};

use gazette_domain::id::{ChatId, SummaryId};

use crate::domain::render::render_summary_message;
use crate::domain::repository::{SummaryDelivery, SummaryRepository, TelegramPort};
use crate::domain::summary::{DeliveryRejection, DeliveryResult};
use crate::domain::telegram::TelegramApiError;
use crate::domain::types::SentMessage;
use crate::error::CronServiceError;

/// Send a stored summary into its community chat, then forward it to the quality-control
/// chat when one is configured.
pub struct DeliverSummaryUseCase<S, T>
where
    S: SummaryRepository,
    T: TelegramPort,
{
    pub summaries: S,
    pub telegram: T,
    pub qc_chat_id: Option<ChatId>,
    pub call_timeout: std::time::Duration,
}

impl<S, T> DeliverSummaryUseCase<S, T>
where
    S: SummaryRepository,
    T: TelegramPort,
{
    pub async fn execute(&self, summary_id: SummaryId) -> Result<DeliveryResult, CronServiceError> {
        let Some(loaded) = self.summaries.find_with_community(summary_id).await? else {
            return Ok(DeliveryResult::Rejected(DeliveryRejection::NoSummaries));
        };
        if !loaded.community.is_active {
            return Ok(DeliveryResult::Rejected(DeliveryRejection::NotActivated));
        }
        if !loaded.community.summary_notifications_enabled {
            return Ok(DeliveryResult::Rejected(
                DeliveryRejection::NotificationsDisabled,
            ));
        }

        let text = render_summary_message(
            loaded.summary.oneliner.as_deref(),
            &loaded.summary.topics,
        );
        let sent = tokio::time::timeout(
            self.call_timeout,
            self.telegram.send_message(loaded.community.chat_id, &text),
        )
        .await
        .unwrap_or_else(|_| Err(TelegramApiError::timeout()))?;

        info!(
            summary_id = %summary_id,
            community_id = %loaded.community.id,
            chat_id = %sent.chat_id,
            message_id = %sent.message_id,
            "summary delivered"
        );

        if let Some(qc_chat_id) = self.qc_chat_id {
            self.forward_to_quality_control(qc_chat_id, summary_id, &sent)
                .await;
        }

        Ok(DeliveryResult::Sent(sent))
    }

    /// Never fails: a forwarding problem must not turn a delivered summary into an error.
    async fn forward_to_quality_control(
        &self,
        qc_chat_id: ChatId,
        summary_id: SummaryId,
        sent: &SentMessage,
    ) {
        let forwarded = tokio::time::timeout(
            self.call_timeout,
            self.telegram
                .forward_message(qc_chat_id, sent.chat_id, sent.message_id),
        )
        .await
        .unwrap_or_else(|_| Err(TelegramApiError::timeout()));

        match forwarded {
            Ok(message_id) => info!(
                summary_id = %summary_id,
                qc_chat_id = %qc_chat_id,
                chat_id = %sent.chat_id,
                message_id = %message_id,
                "summary forwarded to quality control chat"
            ),
            Err(e) => warn!(
                summary_id = %summary_id,
                qc_chat_id = %qc_chat_id,
                chat_id = %sent.chat_id,
                message_id = %sent.message_id,
                error = %e,
                "failed to forward summary to quality control chat"
            ),
        }
    }
}

impl<S, T> SummaryDelivery for DeliverSummaryUseCase<S, T>
where
    S: SummaryRepository,
    T: TelegramPort,
{
    async fn deliver(&self, summary_id: SummaryId) -> Result<DeliveryResult, CronServiceError> {
        self.execute(summary_id).await
    }
}
