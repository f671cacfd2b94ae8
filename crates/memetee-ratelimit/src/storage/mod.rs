pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::RateLimitError;
use crate::limiter::Admission;

/// Storage backend for sliding-window admission
///
/// `check_and_record` is the whole contract: prune entries older than
/// `now_ms - window`, reject without recording when the remainder is at
/// the limit, otherwise record `now_ms` and allow. Implementations may
/// be approximate about atomicity (the in-memory store allows a benign
/// read-then-write overshoot under concurrency) but must never lose
/// recorded admissions.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Check the window for `key` and record the request when admitted
    async fn check_and_record(
        &self,
        key: &str,
        now_ms: i64,
        window: Duration,
        limit: u32,
    ) -> Result<Admission, RateLimitError>;

    /// Drop state for clients with no in-window entries
    async fn sweep(&self, now_ms: i64) -> Result<(), RateLimitError>;
}
