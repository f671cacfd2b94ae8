use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use memetee_core::{ErrorBody, HttpError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemeGenError>;

/// Structured failure reported by a provider adapter
///
/// Adapters translate wire-level signals (HTTP status, provider error
/// codes, transport failures) into these variants, so the public
/// classification below is a pure mapping rather than a text heuristic.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Request timed out or was cancelled by the request deadline
    #[error("request timed out")]
    Timeout,

    /// Account quota or billing limit reached
    #[error("quota exhausted: {0}")]
    QuotaExceeded(String),

    /// Provider refused the content on safety grounds
    #[error("content policy rejection: {0}")]
    ContentPolicy(String),

    /// Provider missing from configuration or rejected the credential
    #[error("provider unavailable: {0}")]
    Unconfigured(String),

    /// Provider requires organization verification for this model
    #[error("verification required: {0}")]
    VerificationRequired(String),

    /// Network-level failure before any provider response
    #[error("connection error: {0}")]
    Connection(String),

    /// Provider API returned an error we have no special handling for
    #[error("provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Provider responded 200 but the payload made no sense
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Public error code for this failure
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout => ErrorCode::Timeout,
            Self::QuotaExceeded(_) => ErrorCode::QuotaExceeded,
            Self::ContentPolicy(_) => ErrorCode::ContentPolicy,
            Self::Unconfigured(_) => ErrorCode::ServiceUnavailable,
            Self::VerificationRequired(_) => ErrorCode::VerificationRequired,
            Self::Connection(_) | Self::Api { .. } | Self::Malformed(_) => ErrorCode::Internal,
        }
    }
}

/// Public classification of a terminal pipeline failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Timeout,
    QuotaExceeded,
    ContentPolicy,
    ServiceUnavailable,
    VerificationRequired,
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            Self::ContentPolicy => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::VerificationRequired => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire name of this code
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "TIMEOUT",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::ContentPolicy => "CONTENT_POLICY",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::VerificationRequired => "VERIFICATION_REQUIRED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// User-facing message, never the raw provider text
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::Timeout => "Meme generation timed out. Please try again.",
            Self::QuotaExceeded => {
                "AI service quota exceeded. Please try again later or contact support."
            }
            Self::ContentPolicy => {
                "Image content not suitable for meme generation. Please try a different image."
            }
            Self::ServiceUnavailable => "No AI service is available right now. Please try again later.",
            Self::VerificationRequired => {
                "The AI provider requires additional account verification for this feature."
            }
            Self::Internal => "Meme generation failed. Please try again.",
        }
    }
}

/// Meme generation request errors
#[derive(Debug, Error)]
pub enum MemeGenError {
    /// Bad input shape or size; detected before any provider call
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Every strategy in the chain failed; classified from the last one
    #[error("all generation strategies failed ({})", .code.as_str())]
    Exhausted {
        code: ErrorCode,
        /// Raw provider message, populated only in development mode
        detail: Option<String>,
    },
}

impl HttpError for MemeGenError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Exhausted { code, .. } => code.status_code(),
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidRequest(_) => None,
            Self::Exhausted { code, .. } => Some(code.as_str()),
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::InvalidRequest(message) => message.clone(),
            Self::Exhausted { code, .. } => code.user_message().to_owned(),
        }
    }
}

impl IntoResponse for MemeGenError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            Self::Exhausted { detail, .. } => detail.clone(),
            Self::InvalidRequest(_) => None,
        };
        let body = ErrorBody::from_error(&self).with_details(detail);
        (status, Json(body)).into_response()
    }
}
