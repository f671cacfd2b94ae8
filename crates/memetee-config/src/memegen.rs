use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;

/// Top-level meme generation configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemeGenConfig {
    /// Provider configurations keyed by name
    #[serde(default)]
    pub providers: IndexMap<String, MemeProviderConfig>,
    /// Pipeline tuning knobs
    #[serde(default)]
    pub options: GenerationOptions,
}

impl MemeGenConfig {
    /// First configured provider of the given type, if any
    pub fn provider_of_type(
        &self,
        wanted: MemeProviderType,
    ) -> Option<(&String, &MemeProviderConfig)> {
        self.providers
            .iter()
            .find(|(_, p)| p.provider_type == wanted)
    }
}

/// Configuration for a single generation provider
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemeProviderConfig {
    /// Provider type
    #[serde(rename = "type")]
    pub provider_type: MemeProviderType,
    /// API key / token
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model override (Replicate: `owner/name`)
    #[serde(default)]
    pub model: Option<String>,
}

/// Supported generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemeProviderType {
    /// `OpenAI` images + vision
    Openai,
    /// Replicate predictions API
    Replicate,
}

/// Pipeline tuning knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationOptions {
    /// Overall request deadline (e.g. "90s"); cancels in-flight provider
    /// calls when it elapses
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    /// Include raw provider error messages in failure responses
    #[serde(default)]
    pub expose_error_details: bool,
    /// Maximum decoded upload size in bytes
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
    /// Vision model used to describe uploaded images
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            expose_error_details: false,
            max_image_bytes: default_max_image_bytes(),
            vision_model: default_vision_model(),
        }
    }
}

impl GenerationOptions {
    /// Parse the request timeout into a duration
    ///
    /// # Errors
    ///
    /// Returns an error when the timeout is not a valid duration string.
    pub fn request_timeout_duration(&self) -> anyhow::Result<std::time::Duration> {
        duration_str::parse(&self.request_timeout)
            .map_err(|e| anyhow::anyhow!("invalid request_timeout '{}': {e}", self.request_timeout))
    }
}

fn default_request_timeout() -> String {
    "90s".to_string()
}

/// 10 MiB, matching the upload contract with the landing page
const fn default_max_image_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_vision_model() -> String {
    "gpt-4o".to_string()
}
