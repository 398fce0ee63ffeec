pub mod cleanup;
pub mod push;
pub mod render;
pub mod repository;
pub mod run_context;
pub mod summary;
pub mod telegram;
pub mod types;
