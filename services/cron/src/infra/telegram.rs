//! Telegram Bot API client.
//!
//! Maps the Bot API envelope `{ok, result, error_code, description}` onto
//! [`TelegramApiError`]. Requests that never get an API answer carry no error code.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use gazette_domain::id::{ChatId, MessageId};

use crate::domain::repository::TelegramPort;
use crate::domain::telegram::TelegramApiError;
use crate::domain::types::{ChatType, SentMessage};

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramBotClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for TelegramBotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBotClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<u16>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct ApiMessage {
    message_id: i32,
    chat: ApiChat,
}

#[derive(Deserialize)]
struct ApiChat {
    id: i64,
    #[serde(rename = "type")]
    kind: ChatType,
}

impl From<ApiMessage> for SentMessage {
    fn from(message: ApiMessage) -> Self {
        Self {
            chat_id: ChatId(message.chat.id),
            message_id: MessageId(message.message_id),
            chat_type: message.chat.kind,
        }
    }
}

impl TelegramBotClient {
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: DEFAULT_TELEGRAM_API_URL.to_owned(),
            token: token.into(),
        })
    }

    /// Point the client at another Bot API server (self-hosted, or a mock in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, TelegramApiError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let response = self
            .http
            .post(&url)
            .json(params)
            .send()
            .await
            // The URL embeds the bot token.
            .map_err(|e| TelegramApiError::transport(e.without_url().to_string()))?;

        let status = response.status();
        debug!(method, status = %status, "telegram api response");

        let envelope: ApiEnvelope<R> = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(TelegramApiError::transport(format!(
                    "unreadable {method} response: {}",
                    e.without_url()
                )));
            }
            Err(_) => {
                return Err(TelegramApiError::api(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown error"),
                ));
            }
        };

        if envelope.ok {
            return envelope
                .result
                .ok_or_else(|| TelegramApiError::transport(format!("{method} returned no result")));
        }
        Err(TelegramApiError {
            error_code: envelope
                .error_code
                .or_else(|| (!status.is_success()).then_some(status.as_u16())),
            description: envelope.description,
        })
    }
}

impl TelegramPort for TelegramBotClient {
    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TelegramApiError> {
        let _: bool = self
            .call(
                "deleteMessage",
                &json!({ "chat_id": chat_id.0, "message_id": message_id.0 }),
            )
            .await?;
        Ok(())
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
    ) -> Result<SentMessage, TelegramApiError> {
        let message: ApiMessage = self
            .call(
                "sendMessage",
                &json!({
                    "chat_id": chat_id.0,
                    "text": text,
                    "parse_mode": "HTML",
                    "link_preview_options": { "is_disabled": true },
                }),
            )
            .await?;
        Ok(message.into())
    }

    async fn forward_message(
        &self,
        to_chat_id: ChatId,
        from_chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<MessageId, TelegramApiError> {
        let message: ApiMessage = self
            .call(
                "forwardMessage",
                &json!({
                    "chat_id": to_chat_id.0,
                    "from_chat_id": from_chat_id.0,
                    "message_id": message_id.0,
                }),
            )
            .await?;
        Ok(MessageId(message.message_id))
    }
}
