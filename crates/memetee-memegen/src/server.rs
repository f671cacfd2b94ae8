use std::sync::Arc;
use std::time::Duration;

use memetee_config::{MemeProviderType, MemeProviderConfig};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use crate::error::MemeGenError;
use crate::image;
use crate::pipeline::Pipeline;
use crate::provider::{openai::OpenAiClient, replicate::ReplicateClient};
use crate::types::{MemeRequest, MemeResponse};

/// Meme generation server: validates, runs the pipeline under a
/// deadline, and shapes the public response
pub struct Server {
    pipeline: Pipeline,
    request_timeout: Duration,
    expose_error_details: bool,
    max_image_bytes: usize,
}

impl Server {
    /// Decoded-upload size limit, used by the router's body limit
    pub const fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    /// Handle one generation request end to end
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for bad payloads (before any provider is
    /// contacted) and `Exhausted` when every strategy fails.
    pub async fn generate(&self, request: MemeRequest) -> crate::error::Result<MemeResponse> {
        // Size/format guard runs first so oversized or garbage uploads
        // never cost a provider call
        let image = match request.image.as_deref() {
            Some(raw) => Some(Arc::new(image::decode_base64_image(
                raw,
                self.max_image_bytes,
            )?)),
            None => None,
        };

        let cancel = CancellationToken::new();
        spawn_deadline(&cancel, self.request_timeout);

        let result = self.pipeline.generate(&request, image, &cancel).await;
        // Stop the deadline watcher
        cancel.cancel();

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(MemeGenError::Exhausted { code, detail }) => {
                return Err(MemeGenError::Exhausted {
                    code,
                    detail: detail.filter(|_| self.expose_error_details),
                });
            }
            Err(other) => return Err(other),
        };

        Ok(MemeResponse {
            success: true,
            meme_url: outcome.image.into_url(),
            provider: outcome.provider,
            prompt_used: outcome.prompt_used,
            revised_prompt: outcome.revised_prompt,
            used_vision: outcome.used_vision,
            attempts: outcome.attempts,
            generation_time: jiff::Timestamp::now().to_string(),
        })
    }
}

/// Cancel the token when the deadline elapses; exits early once the
/// request finishes and cancels the token itself
fn spawn_deadline(cancel: &CancellationToken, deadline: Duration) {
    let watcher = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = watcher.cancelled() => {}
            () = tokio::time::sleep(deadline) => watcher.cancel(),
        }
    });
}

/// Builder for constructing the meme generation server from configuration
pub struct MemeGenServerBuilder<'a> {
    config: &'a memetee_config::Config,
}

impl<'a> MemeGenServerBuilder<'a> {
    pub const fn new(config: &'a memetee_config::Config) -> Self {
        Self { config }
    }

    /// Build the server
    ///
    /// # Errors
    ///
    /// Returns an error when a configured provider is missing its
    /// credential or the request timeout does not parse.
    pub fn build(self) -> anyhow::Result<Server> {
        let memegen = &self.config.memegen;

        let openai = memegen
            .provider_of_type(MemeProviderType::Openai)
            .map(|(name, provider)| {
                tracing::debug!(provider = %name, "initializing openai generation provider");
                Ok::<_, anyhow::Error>(Arc::new(OpenAiClient::new(
                    resolve_api_key(name, provider)?,
                    provider.base_url.clone(),
                )))
            })
            .transpose()?;

        let replicate = memegen
            .provider_of_type(MemeProviderType::Replicate)
            .map(|(name, provider)| {
                tracing::debug!(provider = %name, "initializing replicate generation provider");
                Ok::<_, anyhow::Error>(Arc::new(ReplicateClient::new(
                    resolve_api_key(name, provider)?,
                    provider.base_url.clone(),
                    provider.model.clone(),
                )))
            })
            .transpose()?;

        if openai.is_none() && replicate.is_none() {
            tracing::debug!("no meme generation providers configured, requests will fail as unavailable");
        }

        Ok(Server {
            pipeline: Pipeline::new(openai, replicate, memegen.options.vision_model.clone()),
            request_timeout: memegen.options.request_timeout_duration()?,
            expose_error_details: memegen.options.expose_error_details,
            max_image_bytes: memegen.options.max_image_bytes,
        })
    }
}

fn resolve_api_key(name: &str, config: &MemeProviderConfig) -> anyhow::Result<SecretString> {
    config
        .api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("API key required for generation provider '{name}'"))
}
