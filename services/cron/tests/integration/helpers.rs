use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio::sync::Barrier;
use uuid::Uuid;

use gazette_cron::domain::push::PushMessage;
use gazette_cron::domain::repository::{
    CleanupQueueRepository, CommunityRepository, MessageRepository, PushSender,
    PushTokenRepository, SummaryDelivery, SummaryGeneration, SummaryRepository, TelegramPort,
    TextGenerator,
};
use gazette_cron::domain::run_context::SummaryRunContext;
use gazette_cron::domain::summary::{
    DeliveryResult, GenerateOutcome, InsertOutcome, ONELINER_SYSTEM_PROMPT,
};
use gazette_cron::domain::telegram::TelegramApiError;
use gazette_cron::domain::types::{
    ChatMessage, ChatType, CleanupQueueItem, Community, SentMessage, Summary,
    SummaryWithCommunity, Topic,
};
use gazette_cron::error::CronServiceError;
use gazette_domain::id::{ChatId, CommunityId, MessageId, SummaryId};

pub const TOPICS_JSON: &str = r#"{"topics":[{"title":"Release","content":"The team agreed to ship on Friday. Tests are green.","sources":["Ann"]}]}"#;
pub const ONELINER: &str = "Friday release locked in";

// ── fixtures ─────────────────────────────────────────────────────────────────

pub fn test_community(chat_id: i64) -> Community {
    Community {
        id: CommunityId(Uuid::new_v4()),
        chat_id: ChatId(chat_id),
        chat_title: Some(format!("chat {chat_id}")),
        is_active: true,
        summary_notifications_enabled: true,
    }
}

pub fn muted_community(chat_id: i64) -> Community {
    Community {
        summary_notifications_enabled: false,
        ..test_community(chat_id)
    }
}

pub fn chat_messages(count: usize) -> Vec<ChatMessage> {
    (0..count)
        .map(|i| ChatMessage {
            telegram_message_id: 100 + i as i64,
            author: Some("Ann".to_owned()),
            content: Some(format!("message number {i}")),
        })
        .collect()
}

pub fn queue_item(
    message_id: i32,
    created_at: DateTime<Utc>,
    delete_after: DateTime<Utc>,
) -> CleanupQueueItem {
    CleanupQueueItem {
        id: Uuid::now_v7(),
        chat_id: ChatId(-1001),
        message_id: MessageId(message_id),
        delete_after,
        created_at,
    }
}

// ── MockCleanupQueue ─────────────────────────────────────────────────────────

/// In-memory queue with the same claim semantics as the database: a claim only wins
/// while `delete_after <= now`.
#[derive(Clone, Default)]
pub struct MockCleanupQueue {
    pub items: Arc<Mutex<Vec<CleanupQueueItem>>>,
    pub fail_enqueue: bool,
}

impl MockCleanupQueue {
    pub fn new(items: Vec<CleanupQueueItem>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
            fail_enqueue: false,
        }
    }

    pub fn failing_enqueue() -> Self {
        Self {
            fail_enqueue: true,
            ..Self::default()
        }
    }

    /// Simulate another worker claiming `id` first.
    pub fn steal(&self, id: Uuid, lease_until: DateTime<Utc>) {
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            item.delete_after = lease_until;
        }
    }

    pub fn get(&self, id: Uuid) -> Option<CleanupQueueItem> {
        self.items.lock().unwrap().iter().find(|i| i.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

impl CleanupQueueRepository for MockCleanupQueue {
    async fn enqueue(&self, item: &CleanupQueueItem) -> Result<(), CronServiceError> {
        if self.fail_enqueue {
            return Err(anyhow::anyhow!("queue unavailable").into());
        }
        self.items.lock().unwrap().push(item.clone());
        Ok(())
    }

    async fn find_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<CleanupQueueItem>, CronServiceError> {
        let mut due: Vec<_> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.delete_after <= now)
            .cloned()
            .collect();
        due.sort_by_key(|i| i.delete_after);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn try_claim(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<bool, CronServiceError> {
        // Suspend like a real round trip so concurrent workers interleave.
        tokio::task::yield_now().await;
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|i| i.id == id && i.delete_after <= now) {
            Some(item) => {
                item.delete_after = lease_until;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reschedule(
        &self,
        id: Uuid,
        delete_after: DateTime<Utc>,
    ) -> Result<(), CronServiceError> {
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            item.delete_after = delete_after;
        }
        Ok(())
    }

    async fn delete_batch(&self, ids: &[Uuid]) -> Result<u64, CronServiceError> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| !ids.contains(&i.id));
        Ok((before - items.len()) as u64)
    }
}

// ── MockTelegram ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockTelegram {
    pub chat_type: ChatType,
    pub deleted: Arc<Mutex<Vec<(ChatId, MessageId)>>>,
    pub sent: Arc<Mutex<Vec<(ChatId, String)>>>,
    pub forwarded: Arc<Mutex<Vec<(ChatId, ChatId, MessageId)>>>,
    /// Scripted `deleteMessage` failures keyed by message id.
    pub delete_errors: Arc<Mutex<HashMap<i32, TelegramApiError>>>,
    pub send_error: Option<TelegramApiError>,
    pub forward_error: Option<TelegramApiError>,
    pub delay: Option<StdDuration>,
}

impl MockTelegram {
    pub fn new(chat_type: ChatType) -> Self {
        Self {
            chat_type,
            deleted: Arc::default(),
            sent: Arc::default(),
            forwarded: Arc::default(),
            delete_errors: Arc::default(),
            send_error: None,
            forward_error: None,
            delay: None,
        }
    }

    pub fn fail_delete(&self, message_id: i32, error: TelegramApiError) {
        self.delete_errors.lock().unwrap().insert(message_id, error);
    }

    pub fn deleted_count(&self) -> usize {
        self.deleted.lock().unwrap().len()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Default for MockTelegram {
    fn default() -> Self {
        Self::new(ChatType::Supergroup)
    }
}

impl TelegramPort for MockTelegram {
    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TelegramApiError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(e) = self.delete_errors.lock().unwrap().get(&message_id.0) {
            return Err(e.clone());
        }
        self.deleted.lock().unwrap().push((chat_id, message_id));
        Ok(())
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
    ) -> Result<SentMessage, TelegramApiError> {
        if let Some(e) = &self.send_error {
            return Err(e.clone());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat_id, text.to_owned()));
        Ok(SentMessage {
            chat_id,
            message_id: MessageId(1000 + sent.len() as i32),
            chat_type: self.chat_type,
        })
    }

    async fn forward_message(
        &self,
        to_chat_id: ChatId,
        from_chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<MessageId, TelegramApiError> {
        if let Some(e) = &self.forward_error {
            return Err(e.clone());
        }
        self.forwarded
            .lock()
            .unwrap()
            .push((to_chat_id, from_chat_id, message_id));
        Ok(MessageId(9000))
    }
}

// ── MockCommunityRepo ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCommunityRepo {
    pub communities: Arc<Mutex<Vec<Community>>>,
    pub fail_lookup: bool,
}

impl MockCommunityRepo {
    pub fn new(communities: Vec<Community>) -> Self {
        Self {
            communities: Arc::new(Mutex::new(communities)),
            fail_lookup: false,
        }
    }
}

impl CommunityRepository for MockCommunityRepo {
    async fn list_active(&self) -> Result<Vec<Community>, CronServiceError> {
        Ok(self
            .communities
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_chat_id(
        &self,
        chat_id: ChatId,
    ) -> Result<Option<Community>, CronServiceError> {
        if self.fail_lookup {
            return Err(anyhow::anyhow!("database unavailable").into());
        }
        Ok(self
            .communities
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.chat_id == chat_id)
            .cloned())
    }

    async fn set_summary_notifications(
        &self,
        chat_id: ChatId,
        enabled: bool,
    ) -> Result<bool, CronServiceError> {
        let mut communities = self.communities.lock().unwrap();
        match communities.iter_mut().find(|c| c.chat_id == chat_id) {
            Some(c) => {
                c.summary_notifications_enabled = enabled;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── MockMessageRepo ──────────────────────────────────────────────────────────

/// Window bounds are ignored; each community has a fixed message list.
/// `counts` overrides what `count_in_window` reports, to model a window that
/// changes between the two queries.
#[derive(Clone, Default)]
pub struct MockMessageRepo {
    pub messages: Arc<HashMap<CommunityId, Vec<ChatMessage>>>,
    pub counts: Arc<HashMap<CommunityId, u64>>,
    pub failing: Arc<HashSet<CommunityId>>,
}

impl MockMessageRepo {
    pub fn new(messages: Vec<(CommunityId, Vec<ChatMessage>)>) -> Self {
        Self {
            messages: Arc::new(messages.into_iter().collect()),
            counts: Arc::default(),
            failing: Arc::default(),
        }
    }

    pub fn with_count(mut self, community_id: CommunityId, count: u64) -> Self {
        let mut counts = (*self.counts).clone();
        counts.insert(community_id, count);
        self.counts = Arc::new(counts);
        self
    }

    pub fn with_failing(mut self, community_id: CommunityId) -> Self {
        let mut failing = (*self.failing).clone();
        failing.insert(community_id);
        self.failing = Arc::new(failing);
        self
    }
}

impl MessageRepository for MockMessageRepo {
    async fn count_in_window(
        &self,
        community_id: CommunityId,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<u64, CronServiceError> {
        if self.failing.contains(&community_id) {
            return Err(anyhow::anyhow!("message store unavailable").into());
        }
        if let Some(count) = self.counts.get(&community_id) {
            return Ok(*count);
        }
        Ok(self
            .messages
            .get(&community_id)
            .map_or(0, |m| m.len() as u64))
    }

    async fn list_in_window(
        &self,
        community_id: CommunityId,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<ChatMessage>, CronServiceError> {
        Ok(self
            .messages
            .get(&community_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ── MockSummaryRepo ──────────────────────────────────────────────────────────

/// Enforces uniqueness of (community, trigger key) under one lock, like the unique index.
#[derive(Clone, Default)]
pub struct MockSummaryRepo {
    pub summaries: Arc<Mutex<Vec<Summary>>>,
    pub communities: Arc<Mutex<Vec<Community>>>,
}

impl MockSummaryRepo {
    pub fn new(communities: Vec<Community>) -> Self {
        Self {
            summaries: Arc::default(),
            communities: Arc::new(Mutex::new(communities)),
        }
    }

    pub fn with_summary(self, summary: Summary) -> Self {
        self.summaries.lock().unwrap().push(summary);
        self
    }

    pub fn rows_for(&self, community_id: CommunityId, trigger_key: &str) -> usize {
        self.summaries
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.community_id == community_id && s.trigger_key == trigger_key)
            .count()
    }
}

impl SummaryRepository for MockSummaryRepo {
    async fn find_for_trigger(
        &self,
        community_id: CommunityId,
        trigger_key: &str,
    ) -> Result<Option<Summary>, CronServiceError> {
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.community_id == community_id && s.trigger_key == trigger_key)
            .cloned())
    }

    async fn insert_if_absent(&self, summary: &Summary) -> Result<InsertOutcome, CronServiceError> {
        let mut summaries = self.summaries.lock().unwrap();
        let taken = summaries
            .iter()
            .any(|s| s.community_id == summary.community_id && s.trigger_key == summary.trigger_key);
        if taken {
            return Ok(InsertOutcome::FoundExisting);
        }
        summaries.push(summary.clone());
        Ok(InsertOutcome::Created)
    }

    async fn find_with_community(
        &self,
        id: SummaryId,
    ) -> Result<Option<SummaryWithCommunity>, CronServiceError> {
        let Some(summary) = self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
        else {
            return Ok(None);
        };
        let community = self
            .communities
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == summary.community_id)
            .cloned();
        Ok(community.map(|community| SummaryWithCommunity { summary, community }))
    }
}

pub fn stored_summary(community: &Community, trigger_key: &str) -> Summary {
    Summary {
        id: SummaryId(Uuid::now_v7()),
        community_id: community.id,
        chat_title: community.chat_title.clone(),
        message_count: 12,
        from_message_id: Some(100),
        to_message_id: Some(111),
        topics: vec![Topic {
            title: "Release".to_owned(),
            content: "The team agreed to ship on Friday. Tests are green.".to_owned(),
            sources: vec!["Ann".to_owned()],
        }],
        oneliner: Some(ONELINER.to_owned()),
        trigger_type: "cron_daily_la".to_owned(),
        trigger_key: trigger_key.to_owned(),
        created_at: Utc::now(),
    }
}

// ── MockTextGenerator ────────────────────────────────────────────────────────

/// Answers topic prompts with `TOPICS_JSON` and one-liner prompts with `ONELINER`.
/// With a barrier, every topics call waits until all parties have reached it.
#[derive(Clone, Default)]
pub struct MockTextGenerator {
    pub calls: Arc<Mutex<u32>>,
    pub barrier: Option<Arc<Barrier>>,
    pub topics_response: Option<String>,
}

impl MockTextGenerator {
    pub fn with_barrier(parties: usize) -> Self {
        Self {
            barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn answering(topics_response: &str) -> Self {
        Self {
            topics_response: Some(topics_response.to_owned()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

impl TextGenerator for MockTextGenerator {
    async fn complete(
        &self,
        system: &str,
        _user: &str,
        _temperature: f32,
    ) -> Result<String, CronServiceError> {
        *self.calls.lock().unwrap() += 1;
        if system == ONELINER_SYSTEM_PROMPT {
            return Ok(ONELINER.to_owned());
        }
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        Ok(self
            .topics_response
            .clone()
            .unwrap_or_else(|| TOPICS_JSON.to_owned()))
    }
}

// ── MockGeneration / MockDelivery ────────────────────────────────────────────

/// Scripted generator for aggregator tests; communities without a script fail.
#[derive(Clone, Default)]
pub struct MockGeneration {
    pub outcomes: Arc<HashMap<CommunityId, GenerateOutcome>>,
    pub calls: Arc<Mutex<Vec<CommunityId>>>,
}

impl MockGeneration {
    pub fn new(outcomes: Vec<(CommunityId, GenerateOutcome)>) -> Self {
        Self {
            outcomes: Arc::new(outcomes.into_iter().collect()),
            calls: Arc::default(),
        }
    }

    pub fn called_for(&self, community_id: CommunityId) -> bool {
        self.calls.lock().unwrap().contains(&community_id)
    }
}

impl SummaryGeneration for MockGeneration {
    async fn generate_or_get(
        &self,
        community: &Community,
        _run: &SummaryRunContext,
    ) -> Result<GenerateOutcome, CronServiceError> {
        self.calls.lock().unwrap().push(community.id);
        self.outcomes
            .get(&community.id)
            .copied()
            .ok_or_else(|| CronServiceError::Generation("model unavailable".to_owned()))
    }
}

#[derive(Clone)]
pub struct MockDelivery {
    pub result: DeliveryResult,
    pub delivered: Arc<Mutex<Vec<SummaryId>>>,
}

impl MockDelivery {
    pub fn sending() -> Self {
        Self::returning(DeliveryResult::Sent(SentMessage {
            chat_id: ChatId(-1001),
            message_id: MessageId(1),
            chat_type: ChatType::Supergroup,
        }))
    }

    pub fn returning(result: DeliveryResult) -> Self {
        Self {
            result,
            delivered: Arc::default(),
        }
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

impl SummaryDelivery for MockDelivery {
    async fn deliver(&self, summary_id: SummaryId) -> Result<DeliveryResult, CronServiceError> {
        self.delivered.lock().unwrap().push(summary_id);
        Ok(self.result)
    }
}

// ── push ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockPushTokens {
    pub tokens: Arc<Vec<String>>,
    pub unavailable: bool,
}

impl MockPushTokens {
    pub fn new(count: usize) -> Self {
        Self {
            tokens: Arc::new(
                (0..count)
                    .map(|i| format!("ExponentPushToken[{i}]"))
                    .collect(),
            ),
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

impl PushTokenRepository for MockPushTokens {
    async fn list_tokens(&self) -> Result<Vec<String>, CronServiceError> {
        if self.unavailable {
            return Err(anyhow::anyhow!("push token store unavailable").into());
        }
        Ok(self.tokens.as_ref().clone())
    }
}

/// Records every batch; batches whose position is in `failing` are rejected.
#[derive(Clone, Default)]
pub struct MockPushSender {
    pub batches: Arc<Mutex<Vec<Vec<PushMessage>>>>,
    pub failing: Arc<HashSet<usize>>,
}

impl MockPushSender {
    pub fn failing_batches(positions: &[usize]) -> Self {
        Self {
            failing: Arc::new(positions.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }
}

impl PushSender for MockPushSender {
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<(), CronServiceError> {
        let mut batches = self.batches.lock().unwrap();
        let position = batches.len();
        batches.push(messages.to_vec());
        if self.failing.contains(&position) {
            return Err(anyhow::anyhow!("expo push api returned 500").into());
        }
        Ok(())
    }
}
