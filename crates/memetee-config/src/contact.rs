use secrecy::SecretString;
use serde::Deserialize;

/// Contact form configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactConfig {
    /// Outbound email transport; absent means demo mode (submissions are
    /// accepted but nothing is sent)
    #[serde(default)]
    pub transport: Option<EmailTransportConfig>,
    /// Address that receives submission notifications
    #[serde(default)]
    pub admin_email: Option<String>,
    /// From address on outgoing mail
    #[serde(default)]
    pub from_email: Option<String>,
    /// Display name on outgoing mail
    #[serde(default = "default_business_name")]
    pub business_name: String,
}

/// Email transport selection
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EmailTransportConfig {
    /// Gmail SMTP relay with an app password
    Gmail {
        user: String,
        app_password: SecretString,
    },
    /// SendGrid SMTP relay (user is always "apikey")
    Sendgrid { api_key: SecretString },
    /// Generic SMTP server
    Smtp {
        host: String,
        #[serde(default = "default_smtp_port")]
        port: u16,
        /// Implicit TLS on connect instead of STARTTLS
        #[serde(default)]
        implicit_tls: bool,
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        password: Option<SecretString>,
    },
}

impl EmailTransportConfig {
    /// Short name used in health reporting
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Gmail { .. } => "gmail",
            Self::Sendgrid { .. } => "sendgrid",
            Self::Smtp { .. } => "smtp",
        }
    }
}

fn default_business_name() -> String {
    "MemeTee".to_string()
}

const fn default_smtp_port() -> u16 {
    587
}
