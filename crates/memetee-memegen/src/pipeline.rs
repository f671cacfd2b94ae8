//! The ordered fallback chain
//!
//! Strategies are uniform trait objects tried in order; each failure is
//! recorded in the attempts trace and control falls through to the next
//! entry. Only exhaustion of the whole chain is terminal, classified
//! from the last failure. Reordering providers is a data change here,
//! not a new code path.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{MemeGenError, ProviderError};
use crate::image::ImagePayload;
use crate::prompt;
use crate::provider::openai::{ImageGenerationSpec, OpenAiClient};
use crate::provider::replicate::ReplicateClient;
use crate::types::{AttemptRecord, MemeRequest, ProviderPreference};

/// Everything a strategy needs for one attempt
pub(crate) struct GenerationJob {
    pub image: Option<Arc<ImagePayload>>,
    pub prompt: String,
}

/// Where a generated image lives
#[derive(Debug, Clone)]
pub(crate) enum ImageRef {
    /// Hosted by the provider
    Url(String),
    /// Inline base64 PNG payload
    Base64Png(String),
}

impl ImageRef {
    /// Render as something an `<img src>` can load directly
    pub fn into_url(self) -> String {
        match self {
            Self::Url(url) => url,
            Self::Base64Png(b64) => format!("data:image/png;base64,{b64}"),
        }
    }
}

/// One produced image plus provider-side metadata
#[derive(Debug)]
pub(crate) struct GeneratedImage {
    pub reference: ImageRef,
    pub revised_prompt: Option<String>,
}

/// One concrete attempt path, bound to a provider/model/mode
#[async_trait]
pub(crate) trait GenerationStrategy: Send + Sync {
    /// Name recorded in the attempts trace
    fn name(&self) -> &str;

    /// Provider reported to the caller on success
    fn provider(&self) -> &str;

    /// Make the attempt
    async fn attempt(
        &self,
        job: &GenerationJob,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage, ProviderError>;
}

/// Result of walking the chain: the trace plus either the winning
/// attempt or the last failure
pub(crate) struct ChainOutcome {
    pub attempts: Vec<AttemptRecord>,
    pub result: Result<WonAttempt, ProviderError>,
}

#[derive(Debug)]
pub(crate) struct WonAttempt {
    pub provider: String,
    pub image: GeneratedImage,
}

/// Walk the strategy chain until one succeeds or all are spent
pub(crate) async fn run_chain(
    strategies: &[Box<dyn GenerationStrategy>],
    job: &GenerationJob,
    cancel: &CancellationToken,
) -> ChainOutcome {
    let mut attempts = Vec::with_capacity(strategies.len());
    let mut last_error =
        ProviderError::Unconfigured("no generation providers configured".to_owned());

    for strategy in strategies {
        if cancel.is_cancelled() {
            last_error = ProviderError::Timeout;
            break;
        }

        match strategy.attempt(job, cancel).await {
            Ok(image) => {
                tracing::info!(
                    strategy = strategy.name(),
                    provider = strategy.provider(),
                    "generation strategy succeeded"
                );
                attempts.push(AttemptRecord::success(strategy.name()));
                return ChainOutcome {
                    attempts,
                    result: Ok(WonAttempt {
                        provider: strategy.provider().to_owned(),
                        image,
                    }),
                };
            }
            Err(error) => {
                tracing::warn!(
                    strategy = strategy.name(),
                    error = %error,
                    "generation strategy failed, falling through"
                );
                attempts.push(AttemptRecord::failure(strategy.name(), &error));
                last_error = error;
            }
        }
    }

    ChainOutcome {
        attempts,
        result: Err(last_error),
    }
}

/// Successful pipeline run
pub(crate) struct MemeOutcome {
    pub image: ImageRef,
    pub provider: String,
    pub prompt_used: String,
    pub revised_prompt: Option<String>,
    pub used_vision: bool,
    pub attempts: Vec<AttemptRecord>,
}

/// Builds and runs the strategy chain for each request
pub(crate) struct Pipeline {
    openai: Option<Arc<OpenAiClient>>,
    replicate: Option<Arc<ReplicateClient>>,
    vision_model: String,
}

impl Pipeline {
    pub fn new(
        openai: Option<Arc<OpenAiClient>>,
        replicate: Option<Arc<ReplicateClient>>,
        vision_model: String,
    ) -> Self {
        Self {
            openai,
            replicate,
            vision_model,
        }
    }

    /// Assemble the ordered chain for one request
    ///
    /// Canonical order: dall-e-3, gpt-image-1, image edit (image uploads
    /// only), replicate, dall-e-2. A replicate preference promotes that
    /// strategy to the front; the rest of the ladder stays behind it.
    fn plan(&self, request: &MemeRequest, has_image: bool) -> Vec<Box<dyn GenerationStrategy>> {
        let mut chain: Vec<Box<dyn GenerationStrategy>> = Vec::new();
        let replicate_first = request.provider == ProviderPreference::Replicate;

        if replicate_first && let Some(replicate) = &self.replicate {
            chain.push(Box::new(ReplicateTextToImage {
                client: Arc::clone(replicate),
            }));
        }

        if let Some(openai) = &self.openai {
            chain.push(Box::new(DallE3Text {
                client: Arc::clone(openai),
            }));
            chain.push(Box::new(GptImageText {
                client: Arc::clone(openai),
            }));
            if has_image {
                chain.push(Box::new(OpenAiImageEdit {
                    client: Arc::clone(openai),
                }));
            }
        }

        if !replicate_first && let Some(replicate) = &self.replicate {
            chain.push(Box::new(ReplicateTextToImage {
                client: Arc::clone(replicate),
            }));
        }

        if let Some(openai) = &self.openai {
            chain.push(Box::new(LegacyDallE2 {
                client: Arc::clone(openai),
            }));
        }

        chain
    }

    /// Vision step; failure substitutes the fallback phrase and the run
    /// continues
    async fn describe_image(
        &self,
        image: &ImagePayload,
        cancel: &CancellationToken,
    ) -> Option<String> {
        let client = self.openai.as_ref()?;
        match client
            .describe_image(&self.vision_model, image, cancel)
            .await
        {
            Ok(description) => Some(description),
            Err(error) => {
                tracing::warn!(error = %error, "vision description failed, using fallback phrase");
                None
            }
        }
    }

    /// Run the full pipeline for a validated request
    pub async fn generate(
        &self,
        request: &MemeRequest,
        image: Option<Arc<ImagePayload>>,
        cancel: &CancellationToken,
    ) -> Result<MemeOutcome, MemeGenError> {
        let (description, used_vision) = match image.as_deref() {
            Some(payload) => match self.describe_image(payload, cancel).await {
                Some(description) => (Some(description), true),
                None => (Some(prompt::FALLBACK_IMAGE_DESCRIPTION.to_owned()), false),
            },
            None => (None, false),
        };

        let enhanced = prompt::enhanced_prompt(
            description.as_deref(),
            request.prompt.as_deref(),
            &request.style,
        );

        let job = GenerationJob {
            image,
            prompt: enhanced.clone(),
        };
        let chain = self.plan(request, job.image.is_some());
        let outcome = run_chain(&chain, &job, cancel).await;

        match outcome.result {
            Ok(won) => Ok(MemeOutcome {
                image: won.image.reference,
                provider: won.provider,
                prompt_used: enhanced,
                revised_prompt: won.image.revised_prompt,
                used_vision,
                attempts: outcome.attempts,
            }),
            Err(last_error) => {
                tracing::error!(
                    attempts = outcome.attempts.len(),
                    error = %last_error,
                    "generation pipeline exhausted"
                );
                Err(MemeGenError::Exhausted {
                    code: last_error.code(),
                    detail: Some(last_error.to_string()),
                })
            }
        }
    }
}

// -- Concrete strategies --

struct DallE3Text {
    client: Arc<OpenAiClient>,
}

#[async_trait]
impl GenerationStrategy for DallE3Text {
    fn name(&self) -> &str {
        "dall-e-3"
    }

    fn provider(&self) -> &str {
        "openai"
    }

    async fn attempt(
        &self,
        job: &GenerationJob,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage, ProviderError> {
        self.client
            .generate_image(
                &ImageGenerationSpec {
                    model: "dall-e-3",
                    prompt: &job.prompt,
                    quality: Some("hd"),
                    style: Some("vivid"),
                    response_format: Some("url"),
                },
                cancel,
            )
            .await
    }
}

struct GptImageText {
    client: Arc<OpenAiClient>,
}

#[async_trait]
impl GenerationStrategy for GptImageText {
    fn name(&self) -> &str {
        "gpt-image-1"
    }

    fn provider(&self) -> &str {
        "openai"
    }

    async fn attempt(
        &self,
        job: &GenerationJob,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage, ProviderError> {
        self.client
            .generate_image(
                &ImageGenerationSpec {
                    model: "gpt-image-1",
                    prompt: &job.prompt,
                    quality: Some("medium"),
                    style: None,
                    // gpt-image-1 always returns base64
                    response_format: None,
                },
                cancel,
            )
            .await
    }
}

struct OpenAiImageEdit {
    client: Arc<OpenAiClient>,
}

#[async_trait]
impl GenerationStrategy for OpenAiImageEdit {
    fn name(&self) -> &str {
        "image-edit"
    }

    fn provider(&self) -> &str {
        "openai"
    }

    async fn attempt(
        &self,
        job: &GenerationJob,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage, ProviderError> {
        let image = job.image.as_deref().ok_or_else(|| {
            ProviderError::Malformed("image edit strategy planned without an upload".to_owned())
        })?;
        self.client
            .edit_image("gpt-image-1", &job.prompt, image, cancel)
            .await
    }
}

struct ReplicateTextToImage {
    client: Arc<ReplicateClient>,
}

#[async_trait]
impl GenerationStrategy for ReplicateTextToImage {
    fn name(&self) -> &str {
        self.client.model()
    }

    fn provider(&self) -> &str {
        "replicate"
    }

    async fn attempt(
        &self,
        job: &GenerationJob,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage, ProviderError> {
        self.client.generate(&job.prompt, cancel).await
    }
}

struct LegacyDallE2 {
    client: Arc<OpenAiClient>,
}

#[async_trait]
impl GenerationStrategy for LegacyDallE2 {
    fn name(&self) -> &str {
        "dall-e-2"
    }

    fn provider(&self) -> &str {
        "openai"
    }

    async fn attempt(
        &self,
        _job: &GenerationJob,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage, ProviderError> {
        // Deliberately context-free: the most reliable legacy model with
        // the simplest possible request
        self.client
            .generate_image(
                &ImageGenerationSpec {
                    model: "dall-e-2",
                    prompt: prompt::LEGACY_PROMPT,
                    quality: None,
                    style: None,
                    response_format: Some("url"),
                },
                cancel,
            )
            .await
    }
}
