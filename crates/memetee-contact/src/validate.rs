use std::sync::OnceLock;

use regex::Regex;

use crate::types::{ContactRequest, Submission};

/// RFC-light email shape: something@something.something, no whitespace
fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("must be valid regex"))
}

/// Validate a raw submission against the form contract
///
/// # Errors
///
/// Returns the first user-facing validation message that applies.
pub fn validate(request: &ContactRequest) -> Result<Submission, String> {
    let name = request.name.as_deref().unwrap_or_default();
    let email = request.email.as_deref().unwrap_or_default();
    let message = request.message.as_deref().unwrap_or_default();

    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err("All fields are required".to_owned());
    }

    if name.chars().count() < 2 || name.chars().count() > 100 {
        return Err("Name must be between 2 and 100 characters".to_owned());
    }

    if message.chars().count() < 10 || message.chars().count() > 1000 {
        return Err("Message must be between 10 and 1000 characters".to_owned());
    }

    if !email_re().is_match(email) {
        return Err("Please enter a valid email address".to_owned());
    }

    Ok(Submission {
        name: name.to_owned(),
        email: email.to_owned(),
        message: message.to_owned(),
    })
}
