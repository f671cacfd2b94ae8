use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use memetee_core::{ErrorBody, HttpError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContactError>;

/// Contact form errors
///
/// Delivery failures are deliberately absent: they are downgraded to a
/// success response (see the fail-open policy in the handler).
#[derive(Debug, Error)]
pub enum ContactError {
    /// Submission failed validation
    #[error("{0}")]
    InvalidInput(String),
}

impl HttpError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        None
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::from_error(&self))).into_response()
    }
}
