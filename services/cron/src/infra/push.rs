//! Expo push API client used for mobile app notifications.

use std::time::Duration;

use anyhow::{Context as _, anyhow};
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::domain::push::PushMessage;
use crate::domain::repository::PushSender;
use crate::error::CronServiceError;

pub const DEFAULT_EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

#[derive(Clone)]
pub struct ExpoPushClient {
    http: reqwest::Client,
    url: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for ExpoPushClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpoPushClient")
            .field("url", &self.url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ExpoPushClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
            access_token: None,
        })
    }

    /// Bearer token for projects with enhanced push security enabled.
    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token.filter(|t| !t.is_empty());
        self
    }
}

impl PushSender for ExpoPushClient {
    async fn send_batch(&self, messages: &[PushMessage]) -> Result<(), CronServiceError> {
        if messages.is_empty() {
            return Ok(());
        }

        let mut request = self
            .http
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .json(messages);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("send expo push batch")?;
        let status = response.status();
        debug!(status = %status, batch_size = messages.len(), "expo push response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            return Err(anyhow!("expo push api returned {status}: {body}").into());
        }
        Ok(())
    }
}
