//! Telegram HTML rendering of a stored summary.

use crate::domain::summary::truncate_chars;
use crate::domain::types::Topic;

const MAX_BULLETS: usize = 5;
const MAX_BULLET_CHARS: usize = 450;
const BULLET: &str = "🔹";
const FALLBACK_BULLET: &str = "No detailed points available today.";

/// Render the message delivered to a chat: an optional italic one-liner followed by up
/// to five bullets, one per topic.
pub fn render_summary_message(oneliner: Option<&str>, topics: &[Topic]) -> String {
    let mut bullets: Vec<String> = topics
        .iter()
        .take(MAX_BULLETS)
        .map(|topic| first_sentence(&topic.content))
        .filter(|sentence| !sentence.is_empty())
        .map(|sentence| format!("{BULLET} {}", escape_html(&truncate_bullet(&sentence))))
        .collect();
    if bullets.is_empty() {
        bullets.push(format!("{BULLET} {}", escape_html(FALLBACK_BULLET)));
    }
    let body = bullets.join("\n\n");

    match oneliner.map(normalize_whitespace).filter(|o| !o.is_empty()) {
        Some(oneliner) => format!("<i>{}</i>\n\n{body}", escape_html(&oneliner)),
        None => body,
    }
}

/// Escape the three characters Telegram HTML parse mode reserves.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text up to and including the first `.`, `!` or `?` that ends a word.
fn first_sentence(text: &str) -> String {
    let normalized = normalize_whitespace(text);
    let mut chars = normalized.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                return normalized[..i + c.len_utf8()].to_owned();
            }
        }
    }
    normalized
}

fn truncate_bullet(content: &str) -> String {
    if content.chars().count() <= MAX_BULLET_CHARS {
        return content.to_owned();
    }
    let cut = truncate_chars(content, MAX_BULLET_CHARS - 1);
    format!("{}…", cut.trim_end())
}
