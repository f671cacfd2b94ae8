#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Contact form endpoint
//!
//! Validates `{name, email, message}` and relays it over the configured
//! SMTP transport. Delivery is fail-open: once a submission validates,
//! the visitor always sees success; transport problems are logged for
//! operators instead of bounced back to the form.

mod error;
mod mailer;
mod types;
mod validate;

use std::sync::Arc;

use axum::{Extension, Json, Router, extract::State, routing::post};
use memetee_core::RequestContext;

pub use error::{ContactError, Result};
pub use types::{ContactRequest, ContactResponse};

use mailer::Mailer;

const SUCCESS_MESSAGE: &str =
    "Thank you for your message! We'll get back to you within 24 hours.";

/// Contact server state
pub struct Server {
    mailer: Option<Mailer>,
}

impl Server {
    /// Whether a transport is configured (health reporting)
    pub const fn is_configured(&self) -> bool {
        self.mailer.is_some()
    }
}

/// Build the contact server from configuration
///
/// # Errors
///
/// Returns an error when a transport is configured but unusable.
pub fn build_server(config: &memetee_config::Config) -> anyhow::Result<Arc<Server>> {
    let mailer = Mailer::from_config(&config.contact)
        .map_err(|e| anyhow::anyhow!("Failed to initialize contact mailer: {e}"))?;

    if mailer.is_none() {
        tracing::debug!("no email transport configured, contact form runs in demo mode");
    }

    Ok(Arc::new(Server { mailer }))
}

/// Create the endpoint router for the contact form
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/contact", post(submit))
}

/// Handle contact form submissions
async fn submit(
    State(server): State<Arc<Server>>,
    Extension(context): Extension<RequestContext>,
    Json(request): Json<ContactRequest>,
) -> Result<Json<ContactResponse>> {
    let submission = validate::validate(&request).map_err(ContactError::InvalidInput)?;

    let Some(ref mailer) = server.mailer else {
        tracing::info!(name = %submission.name, "contact submission accepted in demo mode");
        return Ok(Json(ContactResponse {
            success: true,
            message: format!("{SUCCESS_MESSAGE} (Demo mode - email not actually sent)"),
        }));
    };

    match mailer.send_contact(&submission, context.client_id()).await {
        Ok(()) => {
            tracing::info!(
                name = %submission.name,
                email = %submission.email,
                "contact submission relayed"
            );
            Ok(Json(ContactResponse {
                success: true,
                message: SUCCESS_MESSAGE.to_owned(),
            }))
        }
        Err(error) => {
            // Fail open: the visitor should not resubmit because our
            // mail relay hiccupped. Operators find it in the logs.
            tracing::error!(error = %error, "contact email delivery failed");
            Ok(Json(ContactResponse {
                success: true,
                message: format!(
                    "{SUCCESS_MESSAGE} (Note: There was an issue with our email system, \
                     but your message was received)"
                ),
            }))
        }
    }
}
