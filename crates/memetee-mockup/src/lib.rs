#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! T-shirt mockup compositor
//!
//! Pure data composition: picks a base template for the requested color
//! and hands the client a declarative overlay descriptor. No provider
//! calls happen on this path.

mod error;
mod templates;
mod types;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

pub use error::{MockupError, Result};
pub use types::{MockupRequest, MockupResponse, OverlayPosition, TshirtColor};

use templates::TemplateCatalog;

/// Mockup server state
pub struct Server {
    catalog: TemplateCatalog,
}

impl Server {
    /// Compose a mockup response for a validated request
    pub fn compose(&self, request: &MockupRequest) -> Result<MockupResponse> {
        let meme_url = request
            .meme_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| MockupError::InvalidRequest("Meme URL is required".to_owned()))?;

        // Absent color means the default; an unknown color is a fallback
        let color = match request.tshirt_color.as_deref() {
            None => Some(TshirtColor::default()),
            Some(raw) => raw.parse::<TshirtColor>().ok(),
        };

        // Unknown colors and unusable meme references both degrade to the
        // placeholder instead of failing the request
        let reference_ok = url::Url::parse(meme_url).is_ok();

        match (color, reference_ok) {
            (Some(color), true) => Ok(MockupResponse {
                success: true,
                mockup_url: self.catalog.template(color),
                meme_overlay: Some(meme_url.to_owned()),
                overlay_position: Some(OverlayPosition::default()),
                provider: "template".to_owned(),
                tshirt_color: color,
            }),
            (color, reference_ok) => {
                tracing::debug!(
                    color_known = color.is_some(),
                    reference_ok,
                    "falling back to placeholder mockup"
                );
                Ok(MockupResponse {
                    success: true,
                    mockup_url: self.catalog.placeholder(),
                    meme_overlay: reference_ok.then(|| meme_url.to_owned()),
                    overlay_position: reference_ok.then(OverlayPosition::default),
                    provider: "placeholder".to_owned(),
                    tshirt_color: color.unwrap_or_default(),
                })
            }
        }
    }
}

/// Build the mockup server from configuration
pub fn build_server(config: &memetee_config::Config) -> Arc<Server> {
    Arc::new(Server {
        catalog: TemplateCatalog::from_config(&config.mockup),
    })
}

/// Create the endpoint router for mockup composition
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/generate-tshirt-mockup", post(generate_mockup))
}

/// Handle mockup requests
async fn generate_mockup(
    State(server): State<Arc<Server>>,
    Json(request): Json<MockupRequest>,
) -> Result<Json<MockupResponse>> {
    let response = server.compose(&request)?;

    tracing::debug!(
        color = %response.tshirt_color,
        provider = %response.provider,
        "mockup composed"
    );

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> Server {
        Server {
            catalog: TemplateCatalog::from_config(&memetee_config::MockupConfig::default()),
        }
    }

    fn request(meme_url: Option<&str>, color: Option<&str>) -> MockupRequest {
        MockupRequest {
            meme_url: meme_url.map(str::to_owned),
            tshirt_color: color.map(str::to_owned),
        }
    }

    #[test]
    fn valid_color_round_trips() {
        let response = server()
            .compose(&request(Some("https://img.example/meme.png"), Some("navy")))
            .unwrap();

        assert_eq!(response.tshirt_color, TshirtColor::Navy);
        assert_eq!(response.provider, "template");
        assert_eq!(
            response.meme_overlay.as_deref(),
            Some("https://img.example/meme.png")
        );

        let position = response.overlay_position.expect("overlay position present");
        let json = serde_json::to_value(position).unwrap();
        for field in ["top", "left", "width", "height"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn missing_color_defaults_to_white_template() {
        let response = server()
            .compose(&request(Some("https://img.example/meme.png"), None))
            .unwrap();
        assert_eq!(response.tshirt_color, TshirtColor::White);
        assert_eq!(response.provider, "template");
        assert!(response.meme_overlay.is_some());
    }

    #[test]
    fn unknown_color_falls_back_to_placeholder() {
        let response = server()
            .compose(&request(Some("https://img.example/meme.png"), Some("plaid")))
            .unwrap();
        assert_eq!(response.provider, "placeholder");
        assert_eq!(response.tshirt_color, TshirtColor::White);
    }

    #[test]
    fn unusable_meme_reference_omits_the_overlay() {
        let response = server()
            .compose(&request(Some("not a url"), Some("black")))
            .unwrap();
        assert_eq!(response.provider, "placeholder");
        assert!(response.meme_overlay.is_none());
        assert!(response.overlay_position.is_none());
    }

    #[test]
    fn data_url_references_are_accepted() {
        let response = server()
            .compose(&request(Some("data:image/png;base64,QUJD"), Some("gray")))
            .unwrap();
        assert_eq!(response.provider, "template");
    }

    #[test]
    fn missing_meme_url_is_a_validation_error() {
        let err = server().compose(&request(None, Some("white"))).unwrap_err();
        assert!(matches!(err, MockupError::InvalidRequest(ref m) if m.contains("Meme URL")));
    }
}
