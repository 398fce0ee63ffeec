pub mod cleanup;
pub mod helper_message;
pub mod notifications;
pub mod push;
pub mod summary_delivery;
pub mod summary_generate;
pub mod summary_run;
