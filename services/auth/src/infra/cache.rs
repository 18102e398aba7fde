use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::RateLimiter;
use crate::domain::types::RateLimitDecision;
use crate::error::AuthServiceError;

/// Fixed-window counter in Redis. INCR is atomic, so concurrent callers on
/// the same identifier each observe a distinct post-increment count; there
/// is no read-then-write gap.
#[derive(Clone)]
pub struct RedisRateLimiter {
    pub pool: Pool,
}

fn window_key(identifier: &str) -> String {
    format!("ratelimit:{identifier}")
}

impl RateLimiter for RedisRateLimiter {
    async fn check(
        &self,
        identifier: &str,
        window_secs: u64,
        limit: u64,
    ) -> Result<RateLimitDecision, AuthServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| AuthServiceError::Internal(e.into()))?;
        let key = window_key(identifier);

        let count: u64 = conn
            .incr(&key, 1u64)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| AuthServiceError::Internal(e.into()))?;

        // The first hit in a window owns its expiry; boundaries are fixed,
        // not sliding.
        if count == 1 {
            let (): () = conn
                .expire(&key, window_secs as i64)
                .await
                .map_err(|e: deadpool_redis::redis::RedisError| {
                    AuthServiceError::Internal(e.into())
                })?;
        }

        if count > limit {
            let ttl: i64 = conn.ttl(&key).await.map_err(
                |e: deadpool_redis::redis::RedisError| AuthServiceError::Internal(e.into()),
            )?;
            let retry_after_secs = if ttl > 0 { ttl as u64 } else { window_secs };
            return Ok(RateLimitDecision::Limited { retry_after_secs });
        }

        Ok(RateLimitDecision::Allowed)
    }
}
