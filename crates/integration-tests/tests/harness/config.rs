//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use memetee_config::{
    Config, GenerationOptions, MemeProviderConfig, MemeProviderType, RequestRateLimit,
};
use secrecy::SecretString;

/// Builder for constructing test configurations
///
/// Defaults keep rate limits out of the way; tests that exercise the
/// gatekeeper tighten them explicitly.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        let mut config = Config {
            server: memetee_config::ServerConfig {
                listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                ..memetee_config::ServerConfig::default()
            },
            ..Config::default()
        };

        // Generous limits so unrelated tests never trip the gatekeeper
        config.server.rate_limit.meme = limit(100, "5m");
        config.server.rate_limit.mockup = limit(100, "5m");
        config.server.rate_limit.contact = limit(100, "5m");

        // Keep failure-path tests fast
        config.memegen.options = GenerationOptions {
            request_timeout: "10s".to_owned(),
            ..GenerationOptions::default()
        };

        Self { config }
    }

    /// Add an OpenAI provider pointed at a mock backend
    pub fn with_openai_provider(mut self, base_url: &str) -> Self {
        self.config.memegen.providers.insert(
            "openai".to_owned(),
            MemeProviderConfig {
                provider_type: MemeProviderType::Openai,
                api_key: Some(SecretString::from("test-key")),
                base_url: Some(base_url.to_owned()),
                model: None,
            },
        );
        self
    }

    /// Add a Replicate provider pointed at a mock backend
    pub fn with_replicate_provider(mut self, base_url: &str) -> Self {
        self.config.memegen.providers.insert(
            "replicate".to_owned(),
            MemeProviderConfig {
                provider_type: MemeProviderType::Replicate,
                api_key: Some(SecretString::from("test-token")),
                base_url: Some(base_url.to_owned()),
                model: None,
            },
        );
        self
    }

    /// Tighten the meme generation rate limit
    pub fn with_meme_rate_limit(mut self, requests: u32, window: &str) -> Self {
        self.config.server.rate_limit.meme = limit(requests, window);
        self
    }

    /// Tighten the contact form rate limit
    pub fn with_contact_rate_limit(mut self, requests: u32, window: &str) -> Self {
        self.config.server.rate_limit.contact = limit(requests, window);
        self
    }

    /// Cap decoded upload size
    pub fn with_max_image_bytes(mut self, max: usize) -> Self {
        self.config.memegen.options.max_image_bytes = max;
        self
    }

    /// Shorten the overall generation deadline
    pub fn with_request_timeout(mut self, timeout: &str) -> Self {
        self.config.memegen.options.request_timeout = timeout.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}

fn limit(requests: u32, window: &str) -> RequestRateLimit {
    RequestRateLimit {
        requests,
        window: window.to_owned(),
    }
}
