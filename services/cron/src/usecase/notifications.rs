use tracing::info;

use gazette_domain::id::ChatId;

use crate::domain::repository::CommunityRepository;
use crate::error::CronServiceError;

/// Toggle whether daily summaries are delivered to a community chat.
pub struct SetSummaryNotificationsUseCase<C>
where
    C: CommunityRepository,
{
    pub communities: C,
}

impl<C> SetSummaryNotificationsUseCase<C>
where
    C: CommunityRepository,
{
    pub async fn execute(&self, chat_id: ChatId, enabled: bool) -> Result<(), CronServiceError> {
        if !self
            .communities
            .set_summary_notifications(chat_id, enabled)
            .await?
        {
            return Err(CronServiceError::CommunityNotFound);
        }
        info!(chat_id = %chat_id, enabled, "summary notifications updated");
        Ok(())
    }
}
