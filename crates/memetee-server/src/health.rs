use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use memetee_config::{Config, EmailTransportConfig, MemeProviderType};
use serde::Serialize;

/// Configuration-derived availability flags, computed once at startup
#[derive(Debug, Clone, Serialize)]
pub struct ServiceFlags {
    pub ai: AiServiceFlags,
    pub email: EmailServiceFlags,
}

#[derive(Debug, Clone, Serialize)]
pub struct AiServiceFlags {
    pub openai: bool,
    pub replicate: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailServiceFlags {
    pub gmail: bool,
    pub sendgrid: bool,
    pub smtp: bool,
}

impl ServiceFlags {
    pub fn from_config(config: &Config) -> Self {
        let email_kind = config
            .contact
            .transport
            .as_ref()
            .map(EmailTransportConfig::kind);

        Self {
            ai: AiServiceFlags {
                openai: config
                    .memegen
                    .provider_of_type(MemeProviderType::Openai)
                    .is_some(),
                replicate: config
                    .memegen
                    .provider_of_type(MemeProviderType::Replicate)
                    .is_some(),
            },
            email: EmailServiceFlags {
                gmail: email_kind == Some("gmail"),
                sendgrid: email_kind == Some("sendgrid"),
                smtp: email_kind == Some("smtp"),
            },
        }
    }
}

/// Health response body
#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    timestamp: String,
    version: &'static str,
    services: ServiceFlags,
}

/// Health check handler; reports configuration, performs no calls
pub async fn health_handler(State(flags): State<Arc<ServiceFlags>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: jiff::Timestamp::now().to_string(),
        version: env!("CARGO_PKG_VERSION"),
        services: flags.as_ref().clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_reflect_configured_services() {
        let config: Config = toml::from_str(
            r#"
            [memegen.providers.openai]
            type = "openai"
            api_key = "sk-test"

            [contact.transport]
            type = "sendgrid"
            api_key = "SG.test"
            "#,
        )
        .unwrap();

        let flags = ServiceFlags::from_config(&config);
        assert!(flags.ai.openai);
        assert!(!flags.ai.replicate);
        assert!(flags.email.sendgrid);
        assert!(!flags.email.gmail);
    }

    #[test]
    fn empty_config_reports_nothing_available() {
        let flags = ServiceFlags::from_config(&Config::default());
        assert!(!flags.ai.openai);
        assert!(!flags.email.smtp);
    }
}
