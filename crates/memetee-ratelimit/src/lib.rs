#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

mod error;
mod limiter;
pub mod storage;

use std::sync::Arc;

pub use error::RateLimitError;
pub use limiter::{Admission, ScopedLimiter};
pub use storage::RateLimitStore;

use memetee_config::{RateLimitConfig, RateLimitStorage};
use storage::{memory::MemoryStore, redis::RedisStore};

/// One limiter per public resource, all sharing a single store
pub struct Limiters {
    pub meme: Arc<ScopedLimiter>,
    pub mockup: Arc<ScopedLimiter>,
    pub contact: Arc<ScopedLimiter>,
    store: Arc<dyn RateLimitStore>,
}

impl Limiters {
    /// Build all scoped limiters from configuration
    pub fn from_config(config: &RateLimitConfig) -> Result<Self, RateLimitError> {
        let store: Arc<dyn RateLimitStore> = match &config.storage {
            RateLimitStorage::Memory => Arc::new(MemoryStore::new()),
            RateLimitStorage::Redis(redis_config) => {
                Arc::new(RedisStore::new(redis_config.url.as_str())?)
            }
        };

        let build = |scope: &'static str, limit: &memetee_config::RequestRateLimit| {
            let window = limit
                .window_duration()
                .map_err(|e| RateLimitError::Config(e.to_string()))?;
            Ok::<_, RateLimitError>(Arc::new(ScopedLimiter::new(
                scope,
                limit.requests,
                window,
                Arc::clone(&store),
            )))
        };

        let meme = build("meme", &config.meme)?;
        let mockup = build("mockup", &config.mockup)?;
        let contact = build("contact", &config.contact)?;

        Ok(Self {
            meme,
            mockup,
            contact,
            store,
        })
    }

    /// Spawn a background task that periodically evicts idle clients
    ///
    /// Without this the in-memory store grows by one entry per IP ever
    /// seen. The task runs until the process exits.
    pub fn spawn_sweeper(&self, interval: std::time::Duration) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let now = jiff::Timestamp::now().as_millisecond();
                if let Err(e) = store.sweep(now).await {
                    tracing::warn!(error = %e, "rate limit sweep failed");
                }
            }
        });
    }
}
