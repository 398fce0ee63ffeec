//! Bearer authentication for scheduler-triggered routes.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

use crate::error::CronServiceError;

/// The shared secret cron callers must present. `None` means the service was started
/// without `CRON_SECRET`.
#[derive(Clone, Default)]
pub struct CronSecret(pub Option<Arc<str>>);

impl CronSecret {
    pub fn new(secret: Option<String>) -> Self {
        Self(secret.filter(|s| !s.is_empty()).map(Arc::from))
    }
}

/// Proof that the request carried `Authorization: Bearer <CRON_SECRET>`.
///
/// Rejects with 500 `MISCONFIGURED` when no secret is configured and 401 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct CronAuth;

impl<S> FromRequestParts<S> for CronAuth
where
    CronSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CronServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let CronSecret(secret) = CronSecret::from_ref(state);
        let presented = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_owned());

        async move {
            let secret = secret.ok_or(CronServiceError::Misconfigured)?;
            let presented = presented.ok_or(CronServiceError::Unauthorized)?;
            if constant_time_eq(presented.as_bytes(), secret.as_bytes()) {
                Ok(CronAuth)
            } else {
                Err(CronServiceError::Unauthorized)
            }
        }
    }
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
