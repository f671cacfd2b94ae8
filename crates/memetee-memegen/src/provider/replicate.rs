use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::send_cancellable;
use crate::error::ProviderError;
use crate::pipeline::{GeneratedImage, ImageRef};

/// Default Replicate API base URL
const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";

/// Default diffusion model
const DEFAULT_MODEL: &str = "stability-ai/sdxl";

/// Steers the diffusion model away from unusable output
const NEGATIVE_PROMPT: &str = "blurry, low quality, distorted, nsfw, inappropriate";

/// How often to poll an unfinished prediction
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Replicate predictions adapter
///
/// Uses `Prefer: wait` so most predictions return synchronously, and
/// falls back to polling the prediction URL for slow ones. Polling stops
/// when the request's cancellation token fires.
pub(crate) struct ReplicateClient {
    client: Client,
    api_token: SecretString,
    base_url: String,
    model: String,
}

impl ReplicateClient {
    pub fn new(api_token: SecretString, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_token,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Model this client is bound to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run a text-to-image prediction
    pub async fn generate(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<GeneratedImage, ProviderError> {
        let url = format!(
            "{}/models/{}/predictions",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let wire_request = PredictionRequest {
            input: PredictionInput {
                prompt,
                negative_prompt: NEGATIVE_PROMPT,
                num_outputs: 1,
            },
        };

        tracing::debug!(model = %self.model, "sending replicate prediction");

        let builder = self
            .client
            .post(&url)
            .bearer_auth(self.api_token.expose_secret())
            .header("Prefer", "wait")
            .json(&wire_request);

        let response = send_cancellable(builder, cancel).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let mut prediction: Prediction = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("prediction response: {e}")))?;

        while matches!(prediction.status.as_str(), "starting" | "processing") {
            let poll_url = prediction
                .urls
                .as_ref()
                .and_then(|urls| urls.get.as_deref())
                .ok_or_else(|| {
                    ProviderError::Malformed("unfinished prediction without a poll URL".to_owned())
                })?
                .to_owned();

            if cancel
                .run_until_cancelled(tokio::time::sleep(POLL_INTERVAL))
                .await
                .is_none()
            {
                return Err(ProviderError::Timeout);
            }

            let builder = self
                .client
                .get(&poll_url)
                .bearer_auth(self.api_token.expose_secret());
            let response = send_cancellable(builder, cancel).await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }
            prediction = response
                .json()
                .await
                .map_err(|e| ProviderError::Malformed(format!("prediction poll: {e}")))?;
        }

        finish_prediction(prediction)
    }
}

fn finish_prediction(prediction: Prediction) -> Result<GeneratedImage, ProviderError> {
    if prediction.status != "succeeded" {
        let reason = prediction
            .error
            .unwrap_or_else(|| format!("prediction ended as '{}'", prediction.status));
        // Replicate reports safety rejections as NSFW detection errors
        if reason.to_ascii_lowercase().contains("nsfw") {
            return Err(ProviderError::ContentPolicy(reason));
        }
        return Err(ProviderError::Api {
            status: 200,
            message: reason,
        });
    }

    let url = prediction
        .output
        .as_ref()
        .and_then(extract_output_url)
        .ok_or_else(|| ProviderError::Malformed("prediction returned no image URL".to_owned()))?;

    Ok(GeneratedImage {
        reference: ImageRef::Url(url),
        revised_prompt: None,
    })
}

/// Pull the first image URL out of a prediction output
///
/// SDXL-family models return either a bare string or an array of them.
fn extract_output_url(output: &serde_json::Value) -> Option<String> {
    match output {
        serde_json::Value::String(url) if url.starts_with("http") => Some(url.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(extract_output_url),
        _ => None,
    }
}

async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map_or(body, |parsed| parsed.detail);

    match status {
        401 => ProviderError::Unconfigured(message),
        402 => ProviderError::QuotaExceeded(message),
        _ => ProviderError::Api { status, message },
    }
}

// -- Wire types --

#[derive(Serialize)]
struct PredictionRequest<'a> {
    input: PredictionInput<'a>,
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    num_outputs: u32,
}

#[derive(Deserialize)]
struct Prediction {
    status: String,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    detail: String,
}
