use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use memetee_core::{ErrorBody, HttpError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MockupError>;

/// Mockup request errors
#[derive(Debug, Error)]
pub enum MockupError {
    /// Missing or malformed request fields
    #[error("{0}")]
    InvalidRequest(String),
}

impl HttpError for MockupError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        None
    }

    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for MockupError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::from_error(&self))).into_response()
    }
}
