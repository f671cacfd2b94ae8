use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Meme generation request from the landing page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemeRequest {
    /// Base64 image payload, optionally `data:image/...;base64,` prefixed
    #[serde(default)]
    pub image: Option<String>,
    /// Free-text prompt; a default humorous phrase is used when absent
    #[serde(default)]
    pub prompt: Option<String>,
    /// Style tag folded into the enhanced prompt
    #[serde(default = "default_style")]
    pub style: String,
    /// Provider preference
    #[serde(default)]
    pub provider: ProviderPreference,
}

fn default_style() -> String {
    "meme".to_string()
}

/// Which provider the caller wants tried first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderPreference {
    Openai,
    Replicate,
    #[default]
    Auto,
}

/// One entry in the attempts trace
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    /// Strategy that ran
    pub strategy: String,
    /// What happened
    pub outcome: AttemptOutcome,
    /// Failure reason, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttemptRecord {
    pub(crate) fn success(strategy: &str) -> Self {
        Self {
            strategy: strategy.to_owned(),
            outcome: AttemptOutcome::Success,
            error: None,
        }
    }

    pub(crate) fn failure(strategy: &str, error: &ProviderError) -> Self {
        Self {
            strategy: strategy.to_owned(),
            outcome: AttemptOutcome::Failed,
            error: Some(error.to_string()),
        }
    }
}

/// Attempt outcome marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Failed,
}

/// Successful meme generation response
#[derive(Debug, Serialize)]
pub struct MemeResponse {
    pub success: bool,
    /// Hosted URL or inline `data:` URL of the generated meme
    pub meme_url: String,
    /// Provider that produced the winning image
    pub provider: String,
    /// Enhanced prompt that was sent to the provider
    pub prompt_used: String,
    /// Provider-side prompt rewrite, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    /// Whether a vision-derived description seeded the prompt
    pub used_vision: bool,
    /// Ordered trace of every strategy that ran
    pub attempts: Vec<AttemptRecord>,
    /// Completion timestamp (RFC 3339)
    pub generation_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let request: MemeRequest = serde_json::from_str("{}").unwrap();
        assert!(request.image.is_none());
        assert!(request.prompt.is_none());
        assert_eq!(request.style, "meme");
        assert_eq!(request.provider, ProviderPreference::Auto);
    }

    #[test]
    fn provider_preference_parses_lowercase() {
        let request: MemeRequest = serde_json::from_str(r#"{"provider":"replicate"}"#).unwrap();
        assert_eq!(request.provider, ProviderPreference::Replicate);
    }

    #[test]
    fn failure_record_carries_the_reason() {
        let record = AttemptRecord::failure("dall-e-3", &ProviderError::Timeout);
        assert_eq!(record.outcome, AttemptOutcome::Failed);
        assert_eq!(record.error.as_deref(), Some("request timed out"));
    }
}
