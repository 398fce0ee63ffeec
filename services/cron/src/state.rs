use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use crate::auth::CronSecret;
use crate::config::CronConfig;
use crate::infra::cache::{CachedCommunityDirectory, CommunityCache};
use crate::infra::db::{
    DbCleanupQueueRepository, DbCommunityRepository, DbMessageRepository, DbPushTokenRepository,
    DbSummaryRepository,
};
use crate::infra::llm::ChatCompletionsClient;
use crate::infra::push::ExpoPushClient;
use crate::infra::telegram::TelegramBotClient;
use crate::usecase::push::NotifySummariesReadyUseCase;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<CronConfig>,
    pub cron_secret: CronSecret,
    pub telegram: TelegramBotClient,
    pub llm: ChatCompletionsClient,
    pub push: ExpoPushClient,
    pub community_cache: CommunityCache,
}

impl AppState {
    /// Build the state and its HTTP clients from configuration.
    pub fn from_config(db: DatabaseConnection, config: CronConfig) -> Result<Self, reqwest::Error> {
        let timeout = config.external_call_timeout();
        let telegram = TelegramBotClient::new(config.telegram_bot_token.clone(), timeout)?
            .with_base_url(config.telegram_api_url.clone());
        let llm = ChatCompletionsClient::new(
            config.llm_api_url.clone(),
            config.llm_api_key.clone(),
            config.llm_model.clone(),
            timeout,
        )?;
        let push = ExpoPushClient::new(config.expo_push_url.clone(), timeout)?
            .with_access_token(config.expo_access_token.clone());
        Ok(Self {
            db,
            cron_secret: CronSecret::new(config.cron_secret.clone()),
            config: Arc::new(config),
            telegram,
            llm,
            push,
            community_cache: CommunityCache::default(),
        })
    }

    pub fn cleanup_queue_repo(&self) -> DbCleanupQueueRepository {
        DbCleanupQueueRepository {
            db: self.db.clone(),
        }
    }

    pub fn community_repo(&self) -> CachedCommunityDirectory<DbCommunityRepository> {
        CachedCommunityDirectory {
            inner: DbCommunityRepository {
                db: self.db.clone(),
            },
            cache: self.community_cache.clone(),
        }
    }

    pub fn message_repo(&self) -> DbMessageRepository {
        DbMessageRepository {
            db: self.db.clone(),
        }
    }

    pub fn summary_repo(&self) -> DbSummaryRepository {
        DbSummaryRepository {
            db: self.db.clone(),
        }
    }

    pub fn summaries_ready_notifier(
        &self,
    ) -> NotifySummariesReadyUseCase<DbPushTokenRepository, ExpoPushClient> {
        NotifySummariesReadyUseCase {
            tokens: DbPushTokenRepository {
                db: self.db.clone(),
            },
            sender: self.push.clone(),
        }
    }
}

impl FromRef<AppState> for CronSecret {
    fn from_ref(state: &AppState) -> Self {
        state.cron_secret.clone()
    }
}
