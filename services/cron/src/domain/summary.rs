//! Summary pipeline domain: run counters, per-community outcomes, candidate selection and
//! the text handling around the generation backend.

use serde::{Deserialize, Serialize};

use gazette_domain::id::{ChatId, CommunityId, SummaryId};

use crate::domain::types::{ChatMessage, Community, SentMessage, Topic};

pub const DEFAULT_MIN_MESSAGES: u64 = 5;
pub const DEFAULT_SUMMARY_CONCURRENCY: usize = 4;
pub const MAX_SUMMARY_INPUT_CHARS: usize = 12_000;
pub const MAX_ONELINER_CHARS: usize = 110;

pub const TOPICS_SYSTEM_PROMPT: &str = r#"You summarize group chat conversations into topics. Output JSON:
{"topics":[{"title":"Topic Name","content":"Summary paragraph","sources":["Name1","Name2"]}]}
Keep summaries concise. List 1-5 topics. Sources are participant names who contributed to each topic."#;
pub const TOPICS_TEMPERATURE: f32 = 0.3;

pub const ONELINER_SYSTEM_PROMPT: &str = "Given these discussion topics from a group chat, write a single catchy sentence (max 110 characters) that captures the essence of daily conversation. Output only the sentence, no quotes or formatting.";
pub const ONELINER_TEMPERATURE: f32 = 0.5;

const UNKNOWN_AUTHOR: &str = "Unknown";

/// Counters reported by one summary run. `errors` equals the length of the error list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub active_communities: u32,
    pub candidates: u32,
    pub processed: u32,
    pub generated: u32,
    pub existing_for_run: u32,
    pub skipped_not_enough_messages: u32,
    pub skipped_by_notifications_disabled: u32,
    pub delivery_attempted: u32,
    pub delivery_succeeded: u32,
    pub delivery_failed: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorScope {
    Generation,
    Delivery,
}

/// One isolated per-community failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingError {
    pub scope: ErrorScope,
    pub community_id: CommunityId,
    pub chat_id: ChatId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_id: Option<SummaryId>,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Created {
        summary_id: SummaryId,
        message_count: u64,
    },
    Existing {
        summary_id: SummaryId,
        message_count: u64,
    },
    NotEnoughMessages {
        message_count: u64,
    },
}

/// Result of a conflict-ignoring insert on (community, trigger key).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    /// Another writer already holds the row; the conflict is not an error.
    FoundExisting,
}

/// Why a stored summary was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryRejection {
    NoSummaries,
    NotActivated,
    NotificationsDisabled,
}

impl DeliveryRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoSummaries => "no_summaries",
            Self::NotActivated => "not_activated",
            Self::NotificationsDisabled => "notifications_disabled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryResult {
    Sent(SentMessage),
    Rejected(DeliveryRejection),
}

/// Per-community inputs to candidate selection.
#[derive(Debug, Clone)]
pub struct CandidateProbe {
    pub community: Community,
    pub message_count: u64,
    pub has_summary: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateSelection {
    /// Eligible communities, in input order.
    pub candidates: Vec<Community>,
    pub skipped_not_enough_messages: u32,
    pub existing_for_run: u32,
}

/// Keep communities with enough recent messages and no summary for this run yet.
pub fn select_candidates(probes: Vec<CandidateProbe>, min_messages: u64) -> CandidateSelection {
    let mut selection = CandidateSelection::default();
    for probe in probes {
        if probe.message_count < min_messages {
            selection.skipped_not_enough_messages += 1;
        } else if probe.has_summary {
            selection.existing_for_run += 1;
        } else {
            selection.candidates.push(probe.community);
        }
    }
    selection
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopicParseError {
    #[error("invalid JSON from text generation: {0}...")]
    InvalidJson(String),
    #[error("invalid summary format: missing topics array")]
    MissingTopics,
    #[error("invalid topic structure in summary")]
    InvalidTopic,
}

/// Parse `{"topics":[{title, content, sources}]}` as returned by the backend.
pub fn parse_topics(text: &str) -> Result<Vec<Topic>, TopicParseError> {
    let value: serde_json::Value = serde_json::from_str(text.trim())
        .map_err(|_| TopicParseError::InvalidJson(truncate_chars(text, 100)))?;
    let topics = value
        .get("topics")
        .filter(|topics| topics.is_array())
        .cloned()
        .ok_or(TopicParseError::MissingTopics)?;
    Vec::<Topic>::deserialize(topics).map_err(|_| TopicParseError::InvalidTopic)
}

/// Format messages as `Name: text` lines, stopping before the input cap is exceeded.
///
/// A single oversized first line is cut to the cap rather than dropped.
pub fn build_summary_input(messages: &[ChatMessage]) -> String {
    let mut output = String::new();
    let mut output_chars = 0;

    for message in messages {
        let Some(content) = message.content.as_deref().filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        let author = message.author.as_deref().unwrap_or(UNKNOWN_AUTHOR);
        let line = format!("{author}: {content}");
        let line_chars = line.chars().count();
        let next_chars = if output.is_empty() {
            line_chars
        } else {
            output_chars + 1 + line_chars
        };

        if next_chars > MAX_SUMMARY_INPUT_CHARS {
            if output.is_empty() {
                return truncate_chars(&line, MAX_SUMMARY_INPUT_CHARS);
            }
            break;
        }

        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&line);
        output_chars = next_chars;
    }

    output
}

/// User prompt for the one-liner pass: `title: content` per topic.
pub fn oneliner_input(topics: &[Topic]) -> String {
    topics
        .iter()
        .map(|t| format!("{}: {}", t.title, t.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trim and cap a backend one-liner; empty answers become `None`.
pub fn normalize_oneliner(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(truncate_chars(trimmed, MAX_ONELINER_CHARS))
    }
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
