use serde::Deserialize;
use url::Url;

/// Rate limiting configuration
///
/// Each public resource gets its own sliding window so a burst of mockup
/// requests cannot starve the contact form, and vice versa.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Storage backend
    #[serde(default)]
    pub storage: RateLimitStorage,
    /// Meme generation window
    #[serde(default = "default_meme_limit")]
    pub meme: RequestRateLimit,
    /// T-shirt mockup window
    #[serde(default = "default_mockup_limit")]
    pub mockup: RequestRateLimit,
    /// Contact form window
    #[serde(default = "default_contact_limit")]
    pub contact: RequestRateLimit,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            storage: RateLimitStorage::default(),
            meme: default_meme_limit(),
            mockup: default_mockup_limit(),
            contact: default_contact_limit(),
        }
    }
}

/// Rate limit storage backend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RateLimitStorage {
    /// In-memory storage (single instance only)
    #[default]
    Memory,
    /// Redis-backed storage (distributed)
    Redis(RedisConfig),
}

/// Redis configuration for rate limiting
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: Url,
}

/// A single sliding-window limit
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestRateLimit {
    /// Maximum requests per window
    pub requests: u32,
    /// Window duration (e.g. "5m")
    pub window: String,
}

impl RequestRateLimit {
    /// Parse the window string into a duration
    ///
    /// # Errors
    ///
    /// Returns an error when the window is not a valid duration string
    /// or is zero.
    pub fn window_duration(&self) -> anyhow::Result<std::time::Duration> {
        let window = duration_str::parse(&self.window)
            .map_err(|e| anyhow::anyhow!("invalid rate limit window '{}': {e}", self.window))?;
        if window.is_zero() {
            anyhow::bail!("rate limit window must be > 0");
        }
        Ok(window)
    }
}

fn default_meme_limit() -> RequestRateLimit {
    RequestRateLimit {
        requests: 3,
        window: "5m".to_string(),
    }
}

fn default_mockup_limit() -> RequestRateLimit {
    RequestRateLimit {
        requests: 3,
        window: "5m".to_string(),
    }
}

fn default_contact_limit() -> RequestRateLimit {
    RequestRateLimit {
        requests: 2,
        window: "5m".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_launch_policy() {
        let config = RateLimitConfig::default();
        assert_eq!(config.meme.requests, 3);
        assert_eq!(config.contact.requests, 2);
        assert_eq!(config.meme.window_duration().unwrap().as_secs(), 300);
    }

    #[test]
    fn bad_window_is_rejected() {
        let limit = RequestRateLimit {
            requests: 1,
            window: "not-a-duration".to_string(),
        };
        assert!(limit.window_duration().is_err());
    }
}
