//! Outbound transactional mail behind a synchronous notifier seam.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to send email: {0}")]
pub struct MailError(#[from] anyhow::Error);

/// Minimal notifier contract the account lifecycle depends on.
/// Sends are awaited within the triggering request; callers map
/// failures to `EmailDeliveryError` and never roll back persisted state.
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    mailer: SmtpTransport,
    from_address: String,
}

impl SmtpMailer {
    pub fn from_env() -> anyhow::Result<Self> {
        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .unwrap_or(587);
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let from_address =
            env::var("SMTP_FROM_ADDRESS").unwrap_or_else(|_| "noreply@huddle.local".to_string());

        let mailer = if smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&smtp_host)
                .port(smtp_port)
                .build()
        } else {
            let creds = Credentials::new(smtp_username, smtp_password);
            SmtpTransport::relay(&smtp_host)?
                .port(smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            mailer,
            from_address,
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if env::var("SMTP_SKIP_SEND").unwrap_or_default() == "true" {
            return Ok(());
        }

        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid from address: {}", e))?,
            )
            .to(to
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid recipient address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(anyhow::Error::from)?;

        self.mailer.send(&email).map_err(anyhow::Error::from)?;
        Ok(())
    }
}

pub fn verification_email_body(code: &str) -> String {
    format!("Your verification code is: {}", code)
}

pub fn reset_email_body(reset_url: &str) -> String {
    format!(
        "You requested a password reset. Please click the following link to reset your password: {}\n\nThis link is valid for 1 hour. If you did not request a reset, you can ignore this email.",
        reset_url
    )
}
