use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use super::RateLimitStore;
use crate::error::RateLimitError;
use crate::limiter::Admission;

/// In-memory sliding-window store (single instance only)
///
/// Each key maps to the ascending timestamps of its admitted requests.
/// The window longest ago is authoritative for `retry_after`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    windows: DashMap<String, Vec<i64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Number of tracked clients (tests and diagnostics)
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn check_and_record(
        &self,
        key: &str,
        now_ms: i64,
        window: Duration,
        limit: u32,
    ) -> Result<Admission, RateLimitError> {
        let window_ms = window_millis(window);
        let cutoff = now_ms - window_ms;

        let mut entry = self.windows.entry(key.to_owned()).or_default();
        entry.retain(|&stamp| stamp > cutoff);

        if entry.len() >= limit as usize {
            // Oldest surviving entry decides when capacity frees up
            let oldest = entry.first().copied().unwrap_or(now_ms);
            let retry_after_ms = (oldest + window_ms - now_ms).max(0);
            return Ok(Admission::Rejected {
                retry_after: millis_to_secs_ceil(retry_after_ms),
            });
        }

        entry.push(now_ms);
        Ok(Admission::Allowed)
    }

    async fn sweep(&self, now_ms: i64) -> Result<(), RateLimitError> {
        // Longest window in use is minutes; a day of slack keeps the
        // sweep independent of per-limiter configuration.
        let cutoff = now_ms - i64::from(24 * 60 * 60 * 1000u32);
        self.windows
            .retain(|_, stamps| stamps.iter().any(|&stamp| stamp > cutoff));
        Ok(())
    }
}

fn window_millis(window: Duration) -> i64 {
    i64::try_from(window.as_millis()).unwrap_or(i64::MAX)
}

fn millis_to_secs_ceil(ms: i64) -> u64 {
    u64::try_from(ms).unwrap_or(0).div_ceil(1000).max(1)
}
