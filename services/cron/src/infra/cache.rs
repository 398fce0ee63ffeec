use std::sync::Arc;

use dashmap::DashMap;

use gazette_domain::id::ChatId;

use crate::domain::repository::CommunityRepository;
use crate::domain::types::Community;
use crate::error::CronServiceError;

/// Process-wide community entries keyed by Telegram chat id. Cloning shares the map.
#[derive(Clone, Default)]
pub struct CommunityCache {
    entries: Arc<DashMap<ChatId, Community>>,
}

impl CommunityCache {
    pub fn get(&self, chat_id: ChatId) -> Option<Community> {
        self.entries.get(&chat_id).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, community: Community) {
        self.entries.insert(community.chat_id, community);
    }

    pub fn invalidate(&self, chat_id: ChatId) {
        self.entries.remove(&chat_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-through cache in front of a community repository.
///
/// Only hits are cached, so a chat that becomes a community is seen on the next lookup.
/// Writes go to the store first and then drop the cached entry.
pub struct CachedCommunityDirectory<R>
where
    R: CommunityRepository,
{
    pub inner: R,
    pub cache: CommunityCache,
}

impl<R> CommunityRepository for CachedCommunityDirectory<R>
where
    R: CommunityRepository,
{
    async fn list_active(&self) -> Result<Vec<Community>, CronServiceError> {
        self.inner.list_active().await
    }

    async fn find_by_chat_id(
        &self,
        chat_id: ChatId,
    ) -> Result<Option<Community>, CronServiceError> {
        if let Some(community) = self.cache.get(chat_id) {
            return Ok(Some(community));
        }
        let found = self.inner.find_by_chat_id(chat_id).await?;
        if let Some(community) = &found {
            self.cache.insert(community.clone());
        }
        Ok(found)
    }

    async fn set_summary_notifications(
        &self,
        chat_id: ChatId,
        enabled: bool,
    ) -> Result<bool, CronServiceError> {
        let updated = self.inner.set_summary_notifications(chat_id, enabled).await?;
        self.cache.invalidate(chat_id);
        Ok(updated)
    }
}
