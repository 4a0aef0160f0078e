//! Outbound email via SMTP.
//!
//! [`EmailDelivery`] holds one `lettre` STARTTLS transport for the life of
//! the process and implements [`Mailer`]. If `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and email automation is not
//! started.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Connection, TLS, or authentication failure.
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

/// A plain-text email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Anything that can send an [`EmailMessage`]. Tests substitute a recorder.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_FROM_ADDRESS: &str = "Fosterdesk <noreply@fosterdesk.local>";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Sender mailbox, optionally with a display name.
    pub from_address: String,
    /// Where applicants' replies should go, usually the recruitment inbox.
    pub reply_to: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// | Variable        | Default                                   |
    /// |-----------------|-------------------------------------------|
    /// | `SMTP_HOST`     | unset disables email                      |
    /// | `SMTP_PORT`     | `587`                                     |
    /// | `SMTP_FROM`     | `Fosterdesk <noreply@fosterdesk.local>`   |
    /// | `SMTP_REPLY_TO` | unset                                     |
    /// | `SMTP_USER`     | unset                                     |
    /// | `SMTP_PASSWORD` | unset                                     |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        Some(Self {
            smtp_host,
            smtp_port: non_empty("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: non_empty("SMTP_FROM")
                .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            reply_to: non_empty("SMTP_REPLY_TO"),
            smtp_user: non_empty("SMTP_USER"),
            smtp_password: non_empty("SMTP_PASSWORD"),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// SMTP-backed [`Mailer`].
pub struct EmailDelivery {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    reply_to: Option<Mailbox>,
}

impl EmailDelivery {
    /// Parse the sender addresses and set up the transport. Nothing connects
    /// until the first send.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let from: Mailbox = config.from_address.parse()?;
        let reply_to: Option<Mailbox> = config.reply_to.as_deref().map(str::parse).transpose()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);
        if let (Some(user), Some(pass)) = (config.smtp_user, config.smtp_password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            reply_to,
        })
    }

    fn build(&self, message: &EmailMessage) -> Result<Message, EmailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(message.to.parse()?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        if let Some(reply_to) = &self.reply_to {
            builder = builder.reply_to(reply_to.clone());
        }
        builder
            .body(message.body.clone())
            .map_err(|e| EmailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for EmailDelivery {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let email = self.build(message)?;
        self.transport.send(email).await?;

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}
