use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use gazette_core::config::Config;
use gazette_domain::id::ChatId;

use crate::domain::cleanup::{
    CleanupPolicy, DEFAULT_BATCH_LIMIT, DEFAULT_LEASE_SECS, DEFAULT_MAX_RETRY_WINDOW_SECS,
    DEFAULT_RETRY_DELAY_SECS,
};
use crate::domain::run_context::DEFAULT_SUMMARY_INTERVAL_SECS;
use crate::domain::summary::{DEFAULT_MIN_MESSAGES, DEFAULT_SUMMARY_CONCURRENCY};
use crate::domain::types::DEFAULT_HELPER_MESSAGE_TTL_SECS;
use crate::infra::push::DEFAULT_EXPO_PUSH_URL;
use crate::infra::telegram::DEFAULT_TELEGRAM_API_URL;

/// Cron service configuration loaded from environment variables.
///
/// Every tunable has a default; only `DATABASE_URL` is required. Without `CRON_SECRET` the
/// service starts but rejects every cron trigger as misconfigured. Second-valued tunables
/// must be non-negative and representable as a `chrono::Duration`; anything else fails
/// the load.
#[derive(Clone, Deserialize)]
pub struct CronConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on. Env var: `CRON_PORT`.
    #[serde(default = "default_cron_port")]
    pub cron_port: u16,
    /// Bearer token the external scheduler presents.
    #[serde(default)]
    pub cron_secret: Option<String>,

    #[serde(default)]
    pub telegram_bot_token: String,
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// Chat-completions API root, e.g. `https://api.openai.com/v1`.
    #[serde(default = "default_llm_api_url")]
    pub llm_api_url: String,
    #[serde(default)]
    pub llm_api_key: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    #[serde(default = "default_cleanup_batch_limit")]
    pub cleanup_batch_limit: u64,
    #[serde(default = "default_cleanup_lease_secs", deserialize_with = "duration_secs")]
    pub cleanup_lease_secs: i64,
    #[serde(default = "default_cleanup_retry_delay_secs", deserialize_with = "duration_secs")]
    pub cleanup_retry_delay_secs: i64,
    #[serde(
        default = "default_cleanup_max_retry_window_secs",
        deserialize_with = "duration_secs"
    )]
    pub cleanup_max_retry_window_secs: i64,
    #[serde(default = "default_helper_message_ttl_secs", deserialize_with = "duration_secs")]
    pub helper_message_ttl_secs: i64,

    #[serde(default = "default_summary_interval_secs", deserialize_with = "duration_secs")]
    pub summary_interval_secs: i64,
    #[serde(default = "default_summary_min_messages")]
    pub summary_min_messages: u64,
    #[serde(default = "default_summary_concurrency")]
    pub summary_concurrency: usize,
    /// Chat that receives a forwarded copy of every delivered summary.
    #[serde(default)]
    pub summary_qc_chat_id: Option<i64>,

    /// Expo push send endpoint for the summaries-ready notification.
    #[serde(default = "default_expo_push_url")]
    pub expo_push_url: String,
    #[serde(default)]
    pub expo_access_token: Option<String>,

    /// Upper bound on every Telegram, text-generation or push call.
    #[serde(default = "default_external_call_timeout_secs")]
    pub external_call_timeout_secs: u64,
}

impl Config for CronConfig {}

impl CronConfig {
    pub fn cleanup_policy(&self) -> CleanupPolicy {
        CleanupPolicy {
            batch_limit: self.cleanup_batch_limit,
            lease: seconds(self.cleanup_lease_secs),
            retry_delay: seconds(self.cleanup_retry_delay_secs),
            max_retry_window: seconds(self.cleanup_max_retry_window_secs),
        }
    }

    pub fn helper_message_ttl(&self) -> chrono::Duration {
        seconds(self.helper_message_ttl_secs)
    }

    pub fn summary_interval(&self) -> chrono::Duration {
        seconds(self.summary_interval_secs)
    }

    pub fn external_call_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.external_call_timeout_secs)
    }

    pub fn qc_chat_id(&self) -> Option<ChatId> {
        self.summary_qc_chat_id.map(ChatId)
    }
}

impl fmt::Debug for CronConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CronConfig")
            .field("database_url", &"<redacted>")
            .field("cron_port", &self.cron_port)
            .field("cron_secret", &self.cron_secret.as_ref().map(|_| "<redacted>"))
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_api_url", &self.telegram_api_url)
            .field("llm_api_url", &self.llm_api_url)
            .field("llm_api_key", &"<redacted>")
            .field("llm_model", &self.llm_model)
            .field("cleanup_batch_limit", &self.cleanup_batch_limit)
            .field("cleanup_lease_secs", &self.cleanup_lease_secs)
            .field("cleanup_retry_delay_secs", &self.cleanup_retry_delay_secs)
            .field(
                "cleanup_max_retry_window_secs",
                &self.cleanup_max_retry_window_secs,
            )
            .field("helper_message_ttl_secs", &self.helper_message_ttl_secs)
            .field("summary_interval_secs", &self.summary_interval_secs)
            .field("summary_min_messages", &self.summary_min_messages)
            .field("summary_concurrency", &self.summary_concurrency)
            .field("summary_qc_chat_id", &self.summary_qc_chat_id)
            .field("expo_push_url", &self.expo_push_url)
            .field(
                "expo_access_token",
                &self.expo_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "external_call_timeout_secs",
                &self.external_call_timeout_secs,
            )
            .finish()
    }
}

/// Zero for out-of-range values, which `duration_secs` rejects at load.
fn seconds(secs: i64) -> chrono::Duration {
    chrono::Duration::try_seconds(secs).unwrap_or_else(chrono::Duration::zero)
}

fn duration_secs<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = i64::deserialize(deserializer)?;
    if secs < 0 || chrono::Duration::try_seconds(secs).is_none() {
        return Err(D::Error::custom(format!(
            "{secs} is not a valid number of seconds"
        )));
    }
    Ok(secs)
}

fn default_cron_port() -> u16 {
    3120
}

fn default_telegram_api_url() -> String {
    DEFAULT_TELEGRAM_API_URL.to_owned()
}

fn default_llm_api_url() -> String {
    "https://api.openai.com/v1".to_owned()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_owned()
}

fn default_cleanup_batch_limit() -> u64 {
    DEFAULT_BATCH_LIMIT
}

fn default_cleanup_lease_secs() -> i64 {
    DEFAULT_LEASE_SECS
}

fn default_cleanup_retry_delay_secs() -> i64 {
    DEFAULT_RETRY_DELAY_SECS
}

fn default_cleanup_max_retry_window_secs() -> i64 {
    DEFAULT_MAX_RETRY_WINDOW_SECS
}

fn default_helper_message_ttl_secs() -> i64 {
    DEFAULT_HELPER_MESSAGE_TTL_SECS
}

fn default_summary_interval_secs() -> i64 {
    DEFAULT_SUMMARY_INTERVAL_SECS
}

fn default_summary_min_messages() -> u64 {
    DEFAULT_MIN_MESSAGES
}

fn default_summary_concurrency() -> usize {
    DEFAULT_SUMMARY_CONCURRENCY
}

fn default_expo_push_url() -> String {
    DEFAULT_EXPO_PUSH_URL.to_owned()
}

fn default_external_call_timeout_secs() -> u64 {
    30
}
