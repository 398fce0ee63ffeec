use serde::Serialize;
use serde_json::{Value, json};

/// Largest batch the Expo push endpoint accepts in one request.
pub const EXPO_BATCH_LIMIT: usize = 100;

pub const SUMMARIES_READY_TITLE: &str = "New Chat Highlights";
pub const SUMMARIES_READY_BODY: &str = "Your daily summaries are ready";

/// One Expo push message, serialized as the Expo send endpoint expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<&'static str>,
}

/// The "summaries are ready" notification, one message per registered token.
pub fn summaries_ready_messages(tokens: &[String]) -> Vec<PushMessage> {
    tokens
        .iter()
        .map(|token| PushMessage {
            to: token.clone(),
            title: SUMMARIES_READY_TITLE.to_owned(),
            body: SUMMARIES_READY_BODY.to_owned(),
            data: Some(json!({ "screen": "summaries" })),
            sound: Some("default"),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushStats {
    pub recipients: u32,
    pub batches_sent: u32,
    pub batches_failed: u32,
}
