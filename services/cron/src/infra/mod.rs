pub mod cache;
pub mod db;
pub mod llm;
pub mod push;
pub mod telegram;
