#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod image;
mod pipeline;
mod prompt;
mod provider;
mod server;
mod types;

use std::sync::Arc;

use axum::{Json, Router, extract::DefaultBodyLimit, extract::State, routing::post};

pub use error::{ErrorCode, MemeGenError, ProviderError, Result};
pub use types::{AttemptOutcome, AttemptRecord, MemeRequest, MemeResponse, ProviderPreference};

use server::MemeGenServerBuilder;
pub use server::Server;

/// Build the meme generation server from configuration
///
/// # Errors
///
/// Returns an error if the server fails to initialize
pub fn build_server(config: &memetee_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        MemeGenServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize meme generation server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for meme generation
///
/// The body limit leaves headroom for base64 inflation (4/3) plus the
/// JSON envelope around the payload.
pub fn endpoint_router(server: &Arc<Server>) -> Router<Arc<Server>> {
    let body_limit = server.max_image_bytes() / 3 * 4 + 64 * 1024;
    Router::new()
        .route("/generate-meme", post(generate))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// Handle meme generation requests
async fn generate(
    State(server): State<Arc<Server>>,
    Json(request): Json<MemeRequest>,
) -> Result<Json<MemeResponse>> {
    tracing::debug!(
        has_image = request.image.is_some(),
        provider = ?request.provider,
        "meme generation handler called"
    );

    let response = server.generate(request).await?;

    tracing::debug!(provider = %response.provider, "meme generation complete");

    Ok(Json(response))
}
