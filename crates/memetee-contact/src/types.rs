use serde::{Deserialize, Serialize};

/// Raw contact form submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A submission that passed validation
#[derive(Debug, Clone)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Contact form response; always a success shape (see the fail-open
/// delivery policy in the handler)
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}
