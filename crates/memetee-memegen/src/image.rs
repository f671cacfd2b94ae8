use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::MemeGenError;

/// Decoded upload, shared across strategies without re-copying
#[derive(Debug)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Inline data URL for vision calls and image-to-image inputs
    ///
    /// Uploads are JPEG or PNG; providers sniff the real format, so a
    /// JPEG content type is good enough as a container label.
    pub fn to_data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", BASE64.encode(&self.bytes))
    }
}

/// Decode a base64 upload, enforcing the size contract
///
/// Accepts an optional `data:image/...;base64,` prefix. Runs before any
/// provider is contacted so oversized or garbage payloads never cost an
/// API call.
pub fn decode_base64_image(raw: &str, max_bytes: usize) -> Result<ImagePayload, MemeGenError> {
    let encoded = strip_data_url_prefix(raw);

    // A base64 payload decodes to ~3/4 of its length; refuse obviously
    // oversized uploads without allocating for them.
    if encoded.len() / 4 * 3 > max_bytes.saturating_add(4) {
        return Err(too_large(max_bytes));
    }

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|_| MemeGenError::InvalidRequest("Invalid image format".to_owned()))?;

    if bytes.is_empty() {
        return Err(MemeGenError::InvalidRequest("Invalid image format".to_owned()));
    }
    if bytes.len() > max_bytes {
        return Err(too_large(max_bytes));
    }

    Ok(ImagePayload { bytes })
}

fn strip_data_url_prefix(raw: &str) -> &str {
    if raw.starts_with("data:") {
        raw.split_once(',').map_or(raw, |(_, rest)| rest)
    } else {
        raw
    }
}

fn too_large(max_bytes: usize) -> MemeGenError {
    MemeGenError::InvalidRequest(format!(
        "Image too large. Maximum size is {}MB.",
        max_bytes / (1024 * 1024)
    ))
}
