//! Delivery of a single alert email.
//!
//! [`AlertMailer`] is the seam the dispatcher talks to. [`SmtpAlertMailer`] is the production
//! implementation: it owns one pooled lettre SMTP transport, built once at startup and shared by
//! every batch. The pool makes concurrent batches from independent requests safe.

use crate::config::{AppConfig, ConfigError};
use crate::email_templates::{AlertEmailTemplate, LOGO_CONTENT_ID};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

/// One alert email to one recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertEmail {
    pub to: String,
    pub name: String,
    /// Explicit subject; `None` uses [`default_subject`].
    pub subject: Option<String>,
    pub alert_type: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum MailDeliveryError {
    #[error("Invalid recipient address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("Failed to render email template: {0}")]
    Template(#[from] askama::Error),
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

pub fn default_subject(brand_name: &str, alert_type: &str) -> String {
    format!("🚨 {brand_name} Alert - {alert_type}")
}

/// Sends one formatted alert email. Implementations do not retry.
#[async_trait]
pub trait AlertMailer: Send + Sync {
    async fn send_alert(&self, email: &AlertEmail) -> Result<(), MailDeliveryError>;
}

/// Logo attached inline to every email.
#[derive(Clone, Debug)]
pub struct InlineLogo {
    bytes: Vec<u8>,
    content_type: ContentType,
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

impl InlineLogo {
    pub fn png(bytes: Vec<u8>) -> Result<Self, lettre::message::header::ContentTypeErr> {
        Ok(Self {
            bytes,
            content_type: ContentType::parse("image/png")?,
        })
    }

    /// Reads the logo at `path`. The file must be a PNG; it is attached as `image/png`.
    pub fn load_png(path: &str) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|e| {
            ConfigError::Validation(format!("Cannot read alerts.logo_path '{path}': {e}"))
        })?;
        if !bytes.starts_with(PNG_SIGNATURE) {
            return Err(ConfigError::Validation(format!(
                "alerts.logo_path '{path}' is not a PNG image"
            )));
        }
        Self::png(bytes)
            .map_err(|e| ConfigError::Validation(format!("Invalid logo content type: {e}")))
    }
}

pub struct SmtpAlertMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    brand_name: String,
    logo: Option<InlineLogo>,
}

impl SmtpAlertMailer {
    pub fn new(
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
        brand_name: impl Into<String>,
        logo: Option<InlineLogo>,
    ) -> Self {
        Self {
            transport,
            from,
            brand_name: brand_name.into(),
            logo,
        }
    }

    /// Builds the relay transport, sender mailbox and logo from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let smtp = &config.smtp;
        let creds = Credentials::new(smtp.username.clone(), smtp.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.server)
            .map_err(|e| {
                ConfigError::Validation(format!("Invalid SMTP relay '{}': {e}", smtp.server))
            })?
            .port(smtp.port)
            .credentials(creds)
            .build();

        let address: Address = smtp.from.parse().map_err(|e| {
            ConfigError::Validation(format!("smtp.from is not a valid address: {e}"))
        })?;
        let brand_name = config.alerts.brand_name.clone();
        let from = Mailbox::new(Some(format!("{brand_name} Alerts")), address);

        let logo = config
            .alerts
            .logo_path
            .as_deref()
            .map(InlineLogo::load_png)
            .transpose()?;

        Ok(Self::new(transport, from, brand_name, logo))
    }

    /// Renders `email` into a `multipart/alternative` message (plain text + HTML, with the logo
    /// as a related inline part when configured).
    pub fn build_message(&self, email: &AlertEmail) -> Result<Message, MailDeliveryError> {
        let address: Address =
            email
                .to
                .parse()
                .map_err(|source| MailDeliveryError::InvalidAddress {
                    address: email.to.clone(),
                    source,
                })?;
        let display_name = Some(email.name.clone()).filter(|n| !n.trim().is_empty());
        let to = Mailbox::new(display_name, address);

        let subject = email
            .subject
            .clone()
            .unwrap_or_else(|| default_subject(&self.brand_name, &email.alert_type));

        let template = AlertEmailTemplate::new(
            &self.brand_name,
            &email.alert_type,
            &email.name,
            &email.message,
            self.logo.is_some(),
        );
        let html_body = template.render_html()?;
        let text_body = template.render_text();

        let alternative = MultiPart::alternative().singlepart(SinglePart::plain(text_body));
        let alternative = match &self.logo {
            Some(logo) => alternative.multipart(
                MultiPart::related()
                    .singlepart(SinglePart::html(html_body))
                    .singlepart(
                        Attachment::new_inline(LOGO_CONTENT_ID.to_string())
                            .body(logo.bytes.clone(), logo.content_type.clone()),
                    ),
            ),
            None => alternative.singlepart(SinglePart::html(html_body)),
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(lettre::message::header::MIME_VERSION_1_0)
            .message_id(None)
            .multipart(alternative)?;
        Ok(message)
    }
}

#[async_trait]
impl AlertMailer for SmtpAlertMailer {
    #[tracing::instrument(skip(self, email), fields(alert_type = %email.alert_type))]
    async fn send_alert(&self, email: &AlertEmail) -> Result<(), MailDeliveryError> {
        let message = self.build_message(email)?;
        self.transport.send(message).await?;
        Ok(())
    }
}
