//! Mock AI backend for integration tests
//!
//! Serves the OpenAI image/chat surface and the Replicate predictions
//! surface with scripted behavior, counting every call so tests can
//! assert on outbound traffic.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// Scripted backend behavior
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Everything succeeds
    Succeed,
    /// Listed image models fail with 500; everything else succeeds
    FailModels(Vec<&'static str>),
    /// Every call fails with this status and body
    FailAll { status: u16, body: &'static str },
    /// Every call stalls until the client gives up
    Hang,
}

/// Mock provider backend with canned responses
pub struct MockProvider {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    behavior: Behavior,
    vision_count: AtomicU32,
    imagegen_count: AtomicU32,
    edit_count: AtomicU32,
    prediction_count: AtomicU32,
}

impl MockProvider {
    /// Start a mock where every call succeeds
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(Behavior::Succeed).await
    }

    /// Start a mock with scripted behavior
    pub async fn start_with(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            behavior,
            vision_count: AtomicU32::new(0),
            imagegen_count: AtomicU32::new(0),
            edit_count: AtomicU32::new(0),
            prediction_count: AtomicU32::new(0),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat))
            .route("/v1/images/generations", routing::post(handle_imagegen))
            .route("/v1/images/edits", routing::post(handle_edit))
            .route(
                "/v1/models/{owner}/{model}/predictions",
                routing::post(handle_prediction),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown,
            state,
        })
    }

    /// Base URL for configuring the mock as a provider
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Vision (chat) calls received
    pub fn vision_count(&self) -> u32 {
        self.state.vision_count.load(Ordering::Relaxed)
    }

    /// Text-to-image calls received
    pub fn imagegen_count(&self) -> u32 {
        self.state.imagegen_count.load(Ordering::Relaxed)
    }

    /// Image edit calls received
    pub fn edit_count(&self) -> u32 {
        self.state.edit_count.load(Ordering::Relaxed)
    }

    /// Replicate prediction calls received
    pub fn prediction_count(&self) -> u32 {
        self.state.prediction_count.load(Ordering::Relaxed)
    }

    /// All provider-facing calls received
    pub fn total_count(&self) -> u32 {
        self.vision_count() + self.imagegen_count() + self.edit_count() + self.prediction_count()
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Canned vision description; tests assert it flows into the prompt
pub const VISION_DESCRIPTION: &str = "a cat glaring from inside a cardboard box";

#[derive(Debug, Deserialize)]
struct ImageGenRequest {
    model: String,
    #[allow(dead_code)]
    prompt: String,
}

async fn handle_chat(State(state): State<Arc<MockState>>) -> axum::response::Response {
    state.vision_count.fetch_add(1, Ordering::Relaxed);

    if let Some(response) = scripted_failure(&state.behavior).await {
        return response;
    }

    Json(serde_json::json!({
        "choices": [{
            "message": { "role": "assistant", "content": VISION_DESCRIPTION }
        }]
    }))
    .into_response()
}

async fn handle_imagegen(
    State(state): State<Arc<MockState>>,
    Json(request): Json<ImageGenRequest>,
) -> axum::response::Response {
    state.imagegen_count.fetch_add(1, Ordering::Relaxed);

    if let Some(response) = scripted_failure(&state.behavior).await {
        return response;
    }

    if let Behavior::FailModels(models) = &state.behavior
        && models.contains(&request.model.as_str())
    {
        return model_failure(&request.model);
    }

    // gpt-image-1 has no hosted URLs; it always returns base64
    let body = if request.model.starts_with("gpt-image") {
        serde_json::json!({
            "created": 1_700_000_000,
            "data": [{ "b64_json": "bW9jay1wbmc=" }]
        })
    } else {
        serde_json::json!({
            "created": 1_700_000_000,
            "data": [{
                "url": format!("https://mock.images/{}.png", request.model),
                "revised_prompt": "a mock revised prompt"
            }]
        })
    };

    Json(body).into_response()
}

async fn handle_edit(State(state): State<Arc<MockState>>) -> axum::response::Response {
    state.edit_count.fetch_add(1, Ordering::Relaxed);

    if let Some(response) = scripted_failure(&state.behavior).await {
        return response;
    }

    if let Behavior::FailModels(models) = &state.behavior
        && models.contains(&"image-edit")
    {
        return model_failure("image-edit");
    }

    Json(serde_json::json!({
        "created": 1_700_000_000,
        "data": [{ "url": "https://mock.images/edited.png" }]
    }))
    .into_response()
}

async fn handle_prediction(State(state): State<Arc<MockState>>) -> axum::response::Response {
    state.prediction_count.fetch_add(1, Ordering::Relaxed);

    if let Some(response) = scripted_failure(&state.behavior).await {
        return response;
    }

    Json(serde_json::json!({
        "status": "succeeded",
        "output": ["https://mock.images/replicate.png"]
    }))
    .into_response()
}

async fn scripted_failure(behavior: &Behavior) -> Option<axum::response::Response> {
    match behavior {
        Behavior::FailAll { status, body } => Some(
            (
                StatusCode::from_u16(*status).expect("valid status"),
                (*body).to_owned(),
            )
                .into_response(),
        ),
        Behavior::Hang => {
            tokio::time::sleep(Duration::from_secs(120)).await;
            Some(StatusCode::GATEWAY_TIMEOUT.into_response())
        }
        Behavior::Succeed | Behavior::FailModels(_) => None,
    }
}

fn model_failure(model: &str) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": {
                "message": format!("mock failure for {model}"),
                "type": "server_error"
            }
        })),
    )
        .into_response()
}
