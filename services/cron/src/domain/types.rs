use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gazette_domain::id::{ChatId, CommunityId, MessageId, SummaryId};

/// Delay before a helper message is removed when no TTL is given.
pub const DEFAULT_HELPER_MESSAGE_TTL_SECS: i64 = 60;

/// One scheduled deletion of a previously sent helper message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupQueueItem {
    pub id: Uuid,
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub delete_after: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    pub id: CommunityId,
    pub chat_id: ChatId,
    pub chat_title: Option<String>,
    pub is_active: bool,
    pub summary_notifications_enabled: bool,
}

impl Community {
    /// Title passed to the generator; falls back to the chat id for untitled chats.
    pub fn display_title(&self) -> String {
        self.chat_title
            .clone()
            .unwrap_or_else(|| self.chat_id.to_string())
    }
}

/// A captured chat message, already joined with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub telegram_message_id: i64,
    pub author: Option<String>,
    pub content: Option<String>,
}

/// One topic extracted from a day of chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub content: String,
    /// Participant names who contributed to the topic.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub id: SummaryId,
    pub community_id: CommunityId,
    pub chat_title: Option<String>,
    pub message_count: i32,
    pub from_message_id: Option<i64>,
    pub to_message_id: Option<i64>,
    pub topics: Vec<Topic>,
    pub oneliner: Option<String>,
    pub trigger_type: String,
    pub trigger_key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryWithCommunity {
    pub summary: Summary,
    pub community: Community,
}

/// Telegram chat kind, as reported on a sent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatType {
    pub fn is_community(self) -> bool {
        matches!(self, Self::Group | Self::Supergroup)
    }
}

/// A message the bot has just posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub chat_type: ChatType,
}
