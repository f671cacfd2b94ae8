use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::send_cancellable;
use crate::error::ProviderError;
use crate::image::ImagePayload;
use crate::pipeline::{GeneratedImage, ImageRef};
use crate::prompt;

/// Default `OpenAI` API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `OpenAI` adapter covering the three call shapes the pipeline uses:
/// vision captioning, text-to-image, and image editing
pub(crate) struct OpenAiClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

/// Parameters for one text-to-image call
pub(crate) struct ImageGenerationSpec<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    /// `dall-e-3` takes "standard"/"hd"; `gpt-image-1` takes "low".."high"
    pub quality: Option<&'a str>,
    /// `dall-e-3` only
    pub style: Option<&'a str>,
    /// Omitted for `gpt-image-1`, which always returns base64
    pub response_format: Option<&'a str>,
}

impl OpenAiClient {
    pub fn new(api_key: SecretString, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Ask a vision model to describe the uploaded photo
    pub async fn describe_image(
        &self,
        model: &str,
        image: &ImagePayload,
        cancel: &CancellationToken,
    ) -> Result<String, ProviderError> {
        let wire_request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: prompt::VISION_INSTRUCTION,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.to_data_url(),
                        },
                    },
                ],
            }],
            max_tokens: 200,
        };

        tracing::debug!(model, "requesting vision description");

        let builder = self
            .client
            .post(self.url("/chat/completions"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&wire_request);

        let response = send_cancellable(builder, cancel).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let wire_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("vision response: {e}")))?;

        wire_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ProviderError::Malformed("vision response had no content".to_owned()))
    }

    /// Text-to-image generation
    pub async fn generate_image(
        &self,
        spec: &ImageGenerationSpec<'_>,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage, ProviderError> {
        let wire_request = ImageRequest {
            prompt: spec.prompt,
            model: spec.model,
            n: 1,
            size: "1024x1024",
            quality: spec.quality,
            style: spec.style,
            response_format: spec.response_format,
        };

        tracing::debug!(model = spec.model, "sending image generation request");

        let builder = self
            .client
            .post(self.url("/images/generations"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&wire_request);

        let response = send_cancellable(builder, cancel).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        parse_image_response(response).await
    }

    /// Image-to-image editing against the uploaded bytes
    pub async fn edit_image(
        &self,
        model: &str,
        edit_prompt: &str,
        image: &ImagePayload,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage, ProviderError> {
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name("upload.png")
            .mime_str("image/png")
            .map_err(|e| ProviderError::Malformed(format!("image part: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("model", model.to_owned())
            .text("prompt", edit_prompt.to_owned())
            .text("n", "1")
            .text("size", "1024x1024");

        tracing::debug!(model, "sending image edit request");

        let builder = self
            .client
            .post(self.url("/images/edits"))
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form);

        let response = send_cancellable(builder, cancel).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        parse_image_response(response).await
    }
}

async fn parse_image_response(response: reqwest::Response) -> Result<GeneratedImage, ProviderError> {
    let wire_response: ImageResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::Malformed(format!("image response: {e}")))?;

    let data = wire_response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed("image response had no entries".to_owned()))?;

    let reference = match (data.url, data.b64_json) {
        (Some(url), _) => ImageRef::Url(url),
        (None, Some(b64)) => ImageRef::Base64Png(b64),
        (None, None) => {
            return Err(ProviderError::Malformed(
                "image entry had neither url nor b64_json".to_owned(),
            ));
        }
    };

    Ok(GeneratedImage {
        reference,
        revised_prompt: data.revised_prompt,
    })
}

async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    map_api_error(status, &body)
}

/// Translate an `OpenAI` error response into a structured variant
///
/// The error body's machine-readable `code`/`type` fields are
/// authoritative; the HTTP status is the fallback signal.
fn map_api_error(status: u16, body: &str) -> ProviderError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let (message, code, error_type) = parsed.map_or_else(
        || (body.to_owned(), None, None),
        |b| (b.error.message, b.error.code, b.error.r#type),
    );
    let signal = code.or(error_type).unwrap_or_default();

    match signal.as_str() {
        "insufficient_quota" | "billing_hard_limit_reached" => {
            return ProviderError::QuotaExceeded(message);
        }
        "content_policy_violation" | "moderation_blocked" => {
            return ProviderError::ContentPolicy(message);
        }
        _ => {}
    }

    match status {
        401 => ProviderError::Unconfigured(message),
        402 | 429 => ProviderError::QuotaExceeded(message),
        403 => ProviderError::VerificationRequired(message),
        _ => ProviderError::Api { status, message },
    }
}

// -- Wire types --

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    n: u32,
    size: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a str>,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetails,
}

#[derive(Deserialize)]
struct ErrorDetails {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    r#type: Option<String>,
}
