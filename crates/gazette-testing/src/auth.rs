//! Bearer header helpers for cron route tests.
//!
//! The external scheduler authenticates with `Authorization: Bearer <CRON_SECRET>`.
//! `CronBearer` builds that header for a given secret.

use axum::http::{HeaderMap, HeaderValue, header};

/// Secret used by tests that boot the router with a configured cron secret.
pub const TEST_CRON_SECRET: &str = "test-cron-secret";

pub struct CronBearer {
    pub secret: String,
}

impl CronBearer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// The `Authorization` header value.
    pub fn header_value(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.secret)).unwrap()
    }

    /// Return headers as if the scheduler sent them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, self.header_value());
        map
    }
}

impl Default for CronBearer {
    fn default() -> Self {
        Self::new(TEST_CRON_SECRET)
    }
}
