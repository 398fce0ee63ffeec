pub mod communities;
pub mod cron;
pub mod health;
pub mod helper_messages;
