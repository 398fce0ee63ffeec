/// Failure reported by (or on the way to) the Telegram Bot API.
///
/// `error_code` is the Bot API `error_code` (an HTTP status). It is `None` when the
/// request never produced an API answer: transport failures, timeouts, unreadable bodies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", describe(.error_code, .description))]
pub struct TelegramApiError {
    pub error_code: Option<u16>,
    pub description: Option<String>,
}

impl TelegramApiError {
    pub fn api(error_code: u16, description: impl Into<String>) -> Self {
        Self {
            error_code: Some(error_code),
            description: Some(description.into()),
        }
    }

    pub fn transport(description: impl Into<String>) -> Self {
        Self {
            error_code: None,
            description: Some(description.into()),
        }
    }

    pub fn timeout() -> Self {
        Self::transport("request timed out")
    }
}

fn describe(error_code: &Option<u16>, description: &Option<String>) -> String {
    let description = description.as_deref().unwrap_or("unknown error");
    match error_code {
        Some(code) => format!("telegram api error {code}: {description}"),
        None => format!("telegram request failed: {description}"),
    }
}
