use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

use memetee_config::{ContactConfig, EmailTransportConfig};

use crate::types::Submission;

const GMAIL_RELAY: &str = "smtp.gmail.com";
const SENDGRID_RELAY: &str = "smtp.sendgrid.net";

/// Outbound mail relay for contact submissions
///
/// Sends two plain-text messages per submission: a confirmation to the
/// visitor and a notification to the admin inbox.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    admin: Mailbox,
    business_name: String,
}

impl Mailer {
    /// Build the mailer from configuration
    ///
    /// # Errors
    ///
    /// Returns an error when the transport cannot be constructed or the
    /// configured addresses do not parse.
    pub fn from_config(config: &ContactConfig) -> anyhow::Result<Option<Self>> {
        let Some(ref transport_config) = config.transport else {
            return Ok(None);
        };

        let transport = build_transport(transport_config)?;

        let from_address = config
            .from_email
            .clone()
            .or_else(|| gmail_user(transport_config))
            .ok_or_else(|| anyhow::anyhow!("no from_email available for contact mail"))?;

        let admin_address = config
            .admin_email
            .clone()
            .or_else(|| gmail_user(transport_config))
            .ok_or_else(|| anyhow::anyhow!("no admin_email available for contact mail"))?;

        let from = format!("{} <{from_address}>", config.business_name)
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("invalid from address '{from_address}': {e}"))?;
        let admin = admin_address
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("invalid admin address '{admin_address}': {e}"))?;

        Ok(Some(Self {
            transport,
            from,
            admin,
            business_name: config.business_name.clone(),
        }))
    }

    /// Relay one submission: visitor confirmation plus admin notification
    ///
    /// # Errors
    ///
    /// Returns an error when either message fails to build or send. The
    /// caller decides what failure means for the HTTP response.
    pub async fn send_contact(&self, submission: &Submission, client_ip: &str) -> anyhow::Result<()> {
        let confirmation = Message::builder()
            .from(self.from.clone())
            .to(submission
                .email
                .parse::<Mailbox>()
                .map_err(|e| anyhow::anyhow!("invalid recipient address: {e}"))?)
            .subject(format!(
                "Thanks for contacting {}! We'll be in touch soon",
                self.business_name
            ))
            .body(confirmation_body(submission, &self.business_name))?;

        let notification = Message::builder()
            .from(self.from.clone())
            .reply_to(
                submission
                    .email
                    .parse::<Mailbox>()
                    .map_err(|e| anyhow::anyhow!("invalid reply-to address: {e}"))?,
            )
            .to(self.admin.clone())
            .subject(format!("New contact form submission from {}", submission.name))
            .body(notification_body(submission, client_ip))?;

        self.transport.send(confirmation).await?;
        self.transport.send(notification).await?;

        Ok(())
    }
}

fn build_transport(
    config: &EmailTransportConfig,
) -> anyhow::Result<AsyncSmtpTransport<Tokio1Executor>> {
    let transport = match config {
        EmailTransportConfig::Gmail { user, app_password } => {
            AsyncSmtpTransport::<Tokio1Executor>::relay(GMAIL_RELAY)?
                .credentials(Credentials::new(
                    user.clone(),
                    app_password.expose_secret().to_owned(),
                ))
                .build()
        }
        EmailTransportConfig::Sendgrid { api_key } => {
            AsyncSmtpTransport::<Tokio1Executor>::relay(SENDGRID_RELAY)?
                .credentials(Credentials::new(
                    "apikey".to_owned(),
                    api_key.expose_secret().to_owned(),
                ))
                .build()
        }
        EmailTransportConfig::Smtp {
            host,
            port,
            implicit_tls,
            user,
            password,
        } => {
            let mut builder = if *implicit_tls {
                AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            };
            builder = builder.port(*port);
            if let (Some(user), Some(password)) = (user, password) {
                builder = builder.credentials(Credentials::new(
                    user.clone(),
                    password.expose_secret().to_owned(),
                ));
            }
            builder.build()
        }
    };

    Ok(transport)
}

fn gmail_user(config: &EmailTransportConfig) -> Option<String> {
    match config {
        EmailTransportConfig::Gmail { user, .. } => Some(user.clone()),
        _ => None,
    }
}

fn confirmation_body(submission: &Submission, business_name: &str) -> String {
    format!(
        "Hi {},\n\n\
         Thanks for contacting {business_name}! We've received your message:\n\n\
         \"{}\"\n\n\
         We'll get back to you within 24 hours.\n\n\
         Best regards,\n\
         The {business_name} Team",
        submission.name, submission.message
    )
}

fn notification_body(submission: &Submission, client_ip: &str) -> String {
    format!(
        "New contact form submission:\n\n\
         Name: {}\n\
         Email: {}\n\
         Message: \"{}\"\n\n\
         Time: {}\n\
         IP: {client_ip}\n\n\
         Please respond within 24 hours.",
        submission.name,
        submission.email,
        submission.message,
        jiff::Timestamp::now()
    )
}
