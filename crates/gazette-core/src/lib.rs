//! Shared plumbing for gazette services: env config, tracing, HTTP layers, health probes.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
