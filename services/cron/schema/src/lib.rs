pub mod communities;
pub mod messages;
pub mod push_tokens;
pub mod summaries;
pub mod telegram_helper_message_cleanup;
pub mod users;
