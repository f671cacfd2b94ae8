use std::sync::Arc;
use std::time::Duration;

use crate::error::RateLimitError;
use crate::storage::RateLimitStore;

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Request admitted and recorded
    Allowed,
    /// Request rejected; nothing was recorded
    Rejected {
        /// Seconds until the oldest in-window entry ages out
        retry_after: u64,
    },
}

impl Admission {
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Sliding-window limiter for one logical resource
///
/// Keys are prefixed with the scope name so the same client gets an
/// independent window per resource.
pub struct ScopedLimiter {
    scope: &'static str,
    limit: u32,
    window: Duration,
    store: Arc<dyn RateLimitStore>,
}

impl ScopedLimiter {
    pub fn new(
        scope: &'static str,
        limit: u32,
        window: Duration,
        store: Arc<dyn RateLimitStore>,
    ) -> Self {
        Self {
            scope,
            limit,
            window,
            store,
        }
    }

    /// Resource scope this limiter guards
    pub const fn scope(&self) -> &'static str {
        self.scope
    }

    /// Admit or reject a request from `client_id` at the current time
    pub async fn admit(&self, client_id: &str) -> Result<Admission, RateLimitError> {
        self.admit_at(client_id, jiff::Timestamp::now().as_millisecond())
            .await
    }

    /// Admit or reject at an explicit timestamp (milliseconds)
    ///
    /// Split out from [`admit`](Self::admit) so tests can drive the clock.
    pub async fn admit_at(
        &self,
        client_id: &str,
        now_ms: i64,
    ) -> Result<Admission, RateLimitError> {
        let key = format!("{}:{client_id}", self.scope);
        let admission = self
            .store
            .check_and_record(&key, now_ms, self.window, self.limit)
            .await?;

        if let Admission::Rejected { retry_after } = admission {
            tracing::debug!(
                scope = self.scope,
                client_id,
                retry_after,
                "rate limit exceeded"
            );
        }

        Ok(admission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    fn limiter(limit: u32, window_secs: u64) -> ScopedLimiter {
        ScopedLimiter::new(
            "test",
            limit,
            Duration::from_secs(window_secs),
            Arc::new(MemoryStore::new()),
        )
    }

    #[tokio::test]
    async fn admits_up_to_limit_then_rejects() {
        let limiter = limiter(3, 300);
        for _ in 0..3 {
            assert!(limiter.admit_at("1.2.3.4", 1_000).await.unwrap().is_allowed());
        }
        let fourth = limiter.admit_at("1.2.3.4", 2_000).await.unwrap();
        assert_eq!(fourth, Admission::Rejected { retry_after: 299 });
    }

    #[tokio::test]
    async fn rejection_does_not_extend_the_window() {
        let limiter = limiter(1, 10);
        assert!(limiter.admit_at("c", 0).await.unwrap().is_allowed());

        // Hammering while limited must not push the reset time out
        for now in [1_000, 5_000, 9_000] {
            assert!(!limiter.admit_at("c", now).await.unwrap().is_allowed());
        }
        assert!(limiter.admit_at("c", 10_001).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn oldest_entry_aging_out_readmits() {
        let limiter = limiter(2, 60);
        assert!(limiter.admit_at("c", 0).await.unwrap().is_allowed());
        assert!(limiter.admit_at("c", 30_000).await.unwrap().is_allowed());
        assert!(!limiter.admit_at("c", 59_000).await.unwrap().is_allowed());

        // First entry (t=0) leaves the window after 60s
        assert!(limiter.admit_at("c", 60_001).await.unwrap().is_allowed());
        // ...but the t=30s entry still counts
        assert!(!limiter.admit_at("c", 61_000).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn clients_are_isolated() {
        let limiter = limiter(1, 300);
        assert!(limiter.admit_at("alice", 0).await.unwrap().is_allowed());
        assert!(limiter.admit_at("bob", 0).await.unwrap().is_allowed());
        assert!(!limiter.admit_at("alice", 1).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn scopes_are_isolated() {
        let store: Arc<dyn crate::RateLimitStore> = Arc::new(MemoryStore::new());
        let meme = ScopedLimiter::new("meme", 1, Duration::from_secs(300), Arc::clone(&store));
        let contact = ScopedLimiter::new("contact", 1, Duration::from_secs(300), store);

        assert!(meme.admit_at("ip", 0).await.unwrap().is_allowed());
        assert!(contact.admit_at("ip", 0).await.unwrap().is_allowed());
        assert!(!meme.admit_at("ip", 1).await.unwrap().is_allowed());
    }
}
