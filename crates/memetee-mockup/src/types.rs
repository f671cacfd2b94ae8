use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// T-shirt mockup request
#[derive(Debug, Clone, Deserialize)]
pub struct MockupRequest {
    /// Reference to the meme image being printed
    #[serde(default)]
    pub meme_url: Option<String>,
    /// Requested shirt color; unknown values fall back to the placeholder
    #[serde(default)]
    pub tshirt_color: Option<String>,
}

/// Fixed shirt color palette
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TshirtColor {
    #[default]
    White,
    Black,
    Navy,
    Gray,
}

/// Declarative overlay placement for the client-side compositor
///
/// Mirrors the landing page's CSS: the print area is centered on the
/// shirt via a translate transform.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayPosition {
    pub top: &'static str,
    pub left: &'static str,
    pub width: u32,
    pub height: u32,
    pub transform: &'static str,
}

impl Default for OverlayPosition {
    fn default() -> Self {
        Self {
            top: "50%",
            left: "50%",
            width: 120,
            height: 120,
            transform: "translate(-50%, -50%)",
        }
    }
}

/// T-shirt mockup response
#[derive(Debug, Serialize)]
pub struct MockupResponse {
    pub success: bool,
    /// Base shirt template image
    pub mockup_url: String,
    /// Meme to composite onto the template; absent when the reference
    /// was unusable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meme_overlay: Option<String>,
    /// Placement descriptor for the overlay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_position: Option<OverlayPosition>,
    /// "template" for a composed mockup, "placeholder" for the fallback
    pub provider: String,
    pub tshirt_color: TshirtColor,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn colors_parse_case_insensitively() {
        assert_eq!(TshirtColor::from_str("navy").unwrap(), TshirtColor::Navy);
        assert_eq!(TshirtColor::from_str("Black").unwrap(), TshirtColor::Black);
        assert!(TshirtColor::from_str("chartreuse").is_err());
    }

    #[test]
    fn overlay_position_serializes_all_geometry_fields() {
        let json = serde_json::to_value(OverlayPosition::default()).unwrap();
        for field in ["top", "left", "width", "height", "transform"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["width"], 120);
        assert_eq!(json["transform"], "translate(-50%, -50%)");
    }
}
