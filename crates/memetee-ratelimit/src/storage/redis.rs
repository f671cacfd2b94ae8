use std::time::Duration;

use async_trait::async_trait;

use super::RateLimitStore;
use crate::error::RateLimitError;
use crate::limiter::Admission;

/// Redis-backed sliding-window store for multi-instance deployments
///
/// Each key is a sorted set of admission timestamps scored by
/// milliseconds, pruned with `ZREMRANGEBYSCORE` on every check. Keys
/// expire one window after their last admission, so idle clients clean
/// themselves up server-side.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    /// Create a new Redis-backed store
    pub fn new(url: &str) -> Result<Self, RateLimitError> {
        let client = redis::Client::open(url)
            .map_err(|e| RateLimitError::Redis(format!("failed to connect to Redis: {e}")))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, RateLimitError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| RateLimitError::Redis(format!("failed to get connection: {e}")))
    }
}

#[async_trait]
impl RateLimitStore for RedisStore {
    async fn check_and_record(
        &self,
        key: &str,
        now_ms: i64,
        window: Duration,
        limit: u32,
    ) -> Result<Admission, RateLimitError> {
        let mut conn = self.connection().await?;

        let rate_key = format!("memetee:ratelimit:{key}");
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let cutoff = now_ms - window_ms;

        let (count,): (u32,) = redis::pipe()
            .cmd("ZREMRANGEBYSCORE")
            .arg(&rate_key)
            .arg("-inf")
            .arg(cutoff)
            .ignore()
            .cmd("ZCARD")
            .arg(&rate_key)
            .query_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Redis(format!("window prune failed: {e}")))?;

        if count >= limit {
            let oldest: Vec<(String, i64)> = redis::cmd("ZRANGE")
                .arg(&rate_key)
                .arg(0)
                .arg(0)
                .arg("WITHSCORES")
                .query_async(&mut conn)
                .await
                .map_err(|e| RateLimitError::Redis(format!("ZRANGE failed: {e}")))?;

            let retry_after_ms = oldest
                .first()
                .map_or(window_ms, |(_, score)| (score + window_ms - now_ms).max(0));

            return Ok(Admission::Rejected {
                retry_after: u64::try_from(retry_after_ms).unwrap_or(1).div_ceil(1000).max(1),
            });
        }

        let () = redis::pipe()
            .cmd("ZADD")
            .arg(&rate_key)
            .arg(now_ms)
            .arg(now_ms)
            .ignore()
            .cmd("PEXPIRE")
            .arg(&rate_key)
            .arg(window_ms)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| RateLimitError::Redis(format!("ZADD failed: {e}")))?;

        Ok(Admission::Allowed)
    }

    async fn sweep(&self, _now_ms: i64) -> Result<(), RateLimitError> {
        // Key expiry handles eviction server-side
        Ok(())
    }
}
