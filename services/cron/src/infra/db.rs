use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use gazette_cron_schema::{
    communities, messages, push_tokens, summaries, telegram_helper_message_cleanup as cleanup,
    users,
};
use gazette_domain::id::{ChatId, CommunityId, MessageId, SummaryId};

use crate::domain::repository::{
    CleanupQueueRepository, CommunityRepository, MessageRepository, PushTokenRepository,
    SummaryRepository,
};
use crate::domain::summary::InsertOutcome;
use crate::domain::types::{
    ChatMessage, CleanupQueueItem, Community, Summary, SummaryWithCommunity, Topic,
};
use crate::error::CronServiceError;

// ── Cleanup queue repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCleanupQueueRepository {
    pub db: DatabaseConnection,
}

impl CleanupQueueRepository for DbCleanupQueueRepository {
    async fn enqueue(&self, item: &CleanupQueueItem) -> Result<(), CronServiceError> {
        cleanup::ActiveModel {
            id: Set(item.id),
            chat_id: Set(item.chat_id.0),
            message_id: Set(item.message_id.0),
            delete_after: Set(item.delete_after),
            created_at: Set(item.created_at),
        }
        .insert(&self.db)
        .await
        .context("enqueue helper message cleanup")?;
        Ok(())
    }

    async fn find_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<CleanupQueueItem>, CronServiceError> {
        let models = cleanup::Entity::find()
            .filter(cleanup::Column::DeleteAfter.lte(now))
            .order_by_asc(cleanup::Column::DeleteAfter)
            .limit(limit)
            .all(&self.db)
            .await
            .context("find due cleanup items")?;
        Ok(models.into_iter().map(cleanup_item_from_model).collect())
    }

    async fn try_claim(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<bool, CronServiceError> {
        // The `delete_after <= now` guard makes this the lease: concurrent claimers
        // serialize on the row and all but one see zero affected rows.
        let result = cleanup::Entity::update_many()
            .col_expr(cleanup::Column::DeleteAfter, Expr::value(lease_until))
            .filter(cleanup::Column::Id.eq(id))
            .filter(cleanup::Column::DeleteAfter.lte(now))
            .exec(&self.db)
            .await
            .context("claim cleanup item")?;
        Ok(result.rows_affected > 0)
    }

    async fn reschedule(
        &self,
        id: Uuid,
        delete_after: DateTime<Utc>,
    ) -> Result<(), CronServiceError> {
        cleanup::Entity::update_many()
            .col_expr(cleanup::Column::DeleteAfter, Expr::value(delete_after))
            .filter(cleanup::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("reschedule cleanup item")?;
        Ok(())
    }

    async fn delete_batch(&self, ids: &[Uuid]) -> Result<u64, CronServiceError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = cleanup::Entity::delete_many()
            .filter(cleanup::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .context("delete resolved cleanup items")?;
        Ok(result.rows_affected)
    }
}

fn cleanup_item_from_model(model: cleanup::Model) -> CleanupQueueItem {
    CleanupQueueItem {
        id: model.id,
        chat_id: ChatId(model.chat_id),
        message_id: MessageId(model.message_id),
        delete_after: model.delete_after,
        created_at: model.created_at,
    }
}

// ── Community repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCommunityRepository {
    pub db: DatabaseConnection,
}

impl CommunityRepository for DbCommunityRepository {
    async fn list_active(&self) -> Result<Vec<Community>, CronServiceError> {
        let models = communities::Entity::find()
            .filter(communities::Column::IsActive.eq(true))
            .order_by_asc(communities::Column::CreatedAt)
            .order_by_asc(communities::Column::Id)
            .all(&self.db)
            .await
            .context("list active communities")?;
        Ok(models.into_iter().map(community_from_model).collect())
    }

    async fn find_by_chat_id(
        &self,
        chat_id: ChatId,
    ) -> Result<Option<Community>, CronServiceError> {
        let model = communities::Entity::find()
            .filter(communities::Column::ChatId.eq(chat_id.0))
            .one(&self.db)
            .await
            .context("find community by chat id")?;
        Ok(model.map(community_from_model))
    }

    async fn set_summary_notifications(
        &self,
        chat_id: ChatId,
        enabled: bool,
    ) -> Result<bool, CronServiceError> {
        let result = communities::Entity::update_many()
            .col_expr(
                communities::Column::SummaryNotificationsEnabled,
                Expr::value(enabled),
            )
            .filter(communities::Column::ChatId.eq(chat_id.0))
            .exec(&self.db)
            .await
            .context("set summary notifications")?;
        Ok(result.rows_affected > 0)
    }
}

fn community_from_model(model: communities::Model) -> Community {
    Community {
        id: CommunityId(model.id),
        chat_id: ChatId(model.chat_id),
        chat_title: model.chat_title,
        is_active: model.is_active,
        summary_notifications_enabled: model.summary_notifications_enabled,
    }
}

// ── Message repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMessageRepository {
    pub db: DatabaseConnection,
}

impl MessageRepository for DbMessageRepository {
    async fn count_in_window(
        &self,
        community_id: CommunityId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64, CronServiceError> {
        let count = messages::Entity::find()
            .filter(messages::Column::CommunityId.eq(community_id.0))
            .filter(messages::Column::CreatedAt.gte(start))
            .filter(messages::Column::CreatedAt.lte(end))
            .count(&self.db)
            .await
            .context("count messages in window")?;
        Ok(count)
    }

    async fn list_in_window(
        &self,
        community_id: CommunityId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ChatMessage>, CronServiceError> {
        let rows = messages::Entity::find()
            .filter(messages::Column::CommunityId.eq(community_id.0))
            .filter(messages::Column::CreatedAt.gte(start))
            .filter(messages::Column::CreatedAt.lte(end))
            .order_by_asc(messages::Column::TelegramMessageId)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .context("list messages in window")?;
        Ok(rows
            .into_iter()
            .map(|(message, user)| ChatMessage {
                telegram_message_id: message.telegram_message_id,
                author: user.and_then(|u| u.display_name),
                content: message.content,
            })
            .collect())
    }
}

// ── Summary repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSummaryRepository {
    pub db: DatabaseConnection,
}

impl SummaryRepository for DbSummaryRepository {
    async fn find_for_trigger(
        &self,
        community_id: CommunityId,
        trigger_key: &str,
    ) -> Result<Option<Summary>, CronServiceError> {
        let model = summaries::Entity::find()
            .filter(summaries::Column::CommunityId.eq(community_id.0))
            .filter(summaries::Column::TriggerKey.eq(trigger_key))
            .one(&self.db)
            .await
            .context("find summary for trigger")?;
        Ok(model.map(summary_from_model).transpose()?)
    }

    async fn insert_if_absent(&self, summary: &Summary) -> Result<InsertOutcome, CronServiceError> {
        let topics = serde_json::to_value(&summary.topics).context("encode summary topics")?;
        let model = summaries::ActiveModel {
            id: Set(summary.id.0),
            community_id: Set(summary.community_id.0),
            chat_title: Set(summary.chat_title.clone()),
            message_count: Set(summary.message_count),
            from_message_id: Set(summary.from_message_id),
            to_message_id: Set(summary.to_message_id),
            topics: Set(topics),
            oneliner: Set(summary.oneliner.clone()),
            trigger_type: Set(summary.trigger_type.clone()),
            trigger_key: Set(summary.trigger_key.clone()),
            created_at: Set(summary.created_at),
        };
        let inserted = summaries::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    summaries::Column::CommunityId,
                    summaries::Column::TriggerKey,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert summary")?;
        Ok(if inserted == 0 {
            InsertOutcome::FoundExisting
        } else {
            InsertOutcome::Created
        })
    }

    async fn find_with_community(
        &self,
        id: SummaryId,
    ) -> Result<Option<SummaryWithCommunity>, CronServiceError> {
        let row = summaries::Entity::find_by_id(id.0)
            .find_also_related(communities::Entity)
            .one(&self.db)
            .await
            .context("find summary with community")?;
        let Some((summary, Some(community))) = row else {
            return Ok(None);
        };
        Ok(Some(SummaryWithCommunity {
            summary: summary_from_model(summary)?,
            community: community_from_model(community),
        }))
    }
}

fn summary_from_model(model: summaries::Model) -> Result<Summary, CronServiceError> {
    let topics: Vec<Topic> =
        serde_json::from_value(model.topics).context("decode summary topics")?;
    Ok(Summary {
        id: SummaryId(model.id),
        community_id: CommunityId(model.community_id),
        chat_title: model.chat_title,
        message_count: model.message_count,
        from_message_id: model.from_message_id,
        to_message_id: model.to_message_id,
        topics,
        oneliner: model.oneliner,
        trigger_type: model.trigger_type,
        trigger_key: model.trigger_key,
        created_at: model.created_at,
    })
}

// ── Push token repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPushTokenRepository {
    pub db: DatabaseConnection,
}

impl PushTokenRepository for DbPushTokenRepository {
    async fn list_tokens(&self) -> Result<Vec<String>, CronServiceError> {
        let tokens = push_tokens::Entity::find()
            .select_only()
            .column(push_tokens::Column::Token)
            .order_by_asc(push_tokens::Column::CreatedAt)
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .context("list push tokens")?;
        Ok(tokens)
    }
}
