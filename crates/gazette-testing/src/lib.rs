//! Test utilities for gazette services.
//!
//! Provides the cron bearer helper and the contract fixture loader.
//! Import in test code only, never in production code.

pub mod auth;
pub mod fixture;
