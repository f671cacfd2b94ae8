use http::StatusCode;
use serde::Serialize;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The conversion to an
/// actual axum response lives with the feature crate, keeping this crate
/// free of any web-framework dependency.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error code (e.g. `QUOTA_EXCEEDED`), if any
    fn error_code(&self) -> Option<&'static str>;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}

/// JSON envelope returned for every failed request
///
/// Matches the shape the landing page expects: `success` is always
/// `false`, `code` and `details` are present only when meaningful.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    /// Build the envelope from any [`HttpError`]
    pub fn from_error<E: HttpError>(error: &E) -> Self {
        Self {
            success: false,
            error: error.client_message(),
            code: error.error_code(),
            details: None,
        }
    }

    /// Build the envelope from loose parts
    pub const fn new(error: String, code: Option<&'static str>) -> Self {
        Self {
            success: false,
            error,
            code,
            details: None,
        }
    }

    /// Attach a diagnostic detail string (development mode only)
    #[must_use]
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_absent_fields() {
        let body = ErrorBody::new("nope".to_owned(), None);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "nope");
        assert!(json.get("code").is_none());
        assert!(json.get("details").is_none());
    }

    #[test]
    fn envelope_includes_code_and_details() {
        let body = ErrorBody::new("quota".to_owned(), Some("QUOTA_EXCEEDED"))
            .with_details(Some("upstream said no".to_owned()));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "QUOTA_EXCEEDED");
        assert_eq!(json["details"], "upstream said no");
    }
}
