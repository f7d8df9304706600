//! Mail transport trait and SMTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{
    Attachment as MimeAttachment, Mailbox, Mailboxes, MultiPart, SinglePart,
};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use uuid::Uuid;

use super::types::OutgoingMessage;
use crate::config::SmtpConfig;

/// SMTP reply codes that mean the credentials were refused.
const AUTH_FAILURE_CODES: [&str; 4] = ["454", "530", "534", "535"];

/// Failure reported by a mail transport.
///
/// The display string is the transport's own message, unprefixed; the
/// variant classifies the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Sender or recipient address could not be parsed.
    #[error("{0}")]
    Address(String),
    /// The message could not be assembled.
    #[error("{0}")]
    Build(String),
    /// The server could not be reached or the connection broke.
    #[error("{0}")]
    Connection(String),
    /// The server refused the credentials.
    #[error("{0}")]
    Authentication(String),
    /// The server rejected the message or a recipient.
    #[error("{0}")]
    Rejected(String),
    /// The server did not answer in time.
    #[error("{0}")]
    Timeout(String),
}

impl TransportError {
    /// Short machine-readable classification, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Address(_) => "address",
            TransportError::Build(_) => "build",
            TransportError::Connection(_) => "connection",
            TransportError::Authentication(_) => "authentication",
            TransportError::Rejected(_) => "rejected",
            TransportError::Timeout(_) => "timeout",
        }
    }
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            return TransportError::Timeout(message);
        }
        match err.status() {
            Some(code) if AUTH_FAILURE_CODES.contains(&code.to_string().as_str()) => {
                TransportError::Authentication(message)
            }
            Some(_) => TransportError::Rejected(message),
            None => TransportError::Connection(message),
        }
    }
}

/// Async email transport.
///
/// `send` makes exactly one delivery attempt and returns the message
/// identifier assigned to the message.
#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
    /// Deliver a message.
    async fn send(&self, message: &OutgoingMessage) -> Result<String, TransportError>;

    /// Check that the transport can reach its server.
    async fn verify(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// SMTP transport using lettre.
///
/// lettre keeps a connection pool internally; one instance is built at
/// startup and shared by all requests.
#[derive(Clone)]
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Create a transport from configuration.
    ///
    /// `secure` selects implicit TLS. Otherwise STARTTLS is used when the
    /// server offers it, unless `tls = "none"`.
    pub fn from_config(config: &SmtpConfig) -> Result<Self, TransportError> {
        let mut builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else if config.tls == "none" {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        } else {
            let parameters = TlsParameters::new(config.host.clone())?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .tls(Tls::Opportunistic(parameters))
        };

        builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if let (Some(user), Some(pass)) = (&config.user, &config.pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, message: &OutgoingMessage) -> Result<String, TransportError> {
        let (email, message_id) = build_message(message)?;

        let response = self.transport.send(email).await?;
        tracing::debug!(
            code = %response.code(),
            message_id = %message_id,
            "SMTP server accepted message"
        );

        Ok(message_id)
    }

    async fn verify(&self) -> Result<(), TransportError> {
        if self.transport.test_connection().await? {
            Ok(())
        } else {
            Err(TransportError::Connection(
                "SMTP server did not accept the connection test".to_string(),
            ))
        }
    }
}

enum Body {
    Single(SinglePart),
    Multi(MultiPart),
}

/// Build a lettre message and its Message-ID from an outgoing message.
pub(crate) fn build_message(message: &OutgoingMessage) -> Result<(Message, String), TransportError> {
    let from: Mailbox = message.from.parse().map_err(|e| {
        TransportError::Address(format!("invalid sender address '{}': {e}", message.from))
    })?;
    let message_id = format!("<{}@{}>", Uuid::new_v4(), from.email.domain());

    let mut builder = Message::builder()
        .from(from)
        .subject(message.subject.clone())
        .message_id(Some(message_id.clone()));

    for entry in &message.to {
        let mailboxes: Mailboxes = entry.parse().map_err(|e| {
            TransportError::Address(format!("invalid recipient address '{entry}': {e}"))
        })?;
        for mailbox in mailboxes {
            builder = builder.to(mailbox);
        }
    }

    let body = match (&message.text, &message.html) {
        (Some(text), Some(html)) => Body::Multi(MultiPart::alternative_plain_html(
            text.clone(),
            html.clone(),
        )),
        (Some(text), None) => Body::Single(SinglePart::plain(text.clone())),
        (None, Some(html)) => Body::Single(SinglePart::html(html.clone())),
        (None, None) => return Err(TransportError::Build("message has no body".to_string())),
    };

    let body = if message.attachments.is_empty() {
        body
    } else {
        let mut mixed = match body {
            Body::Single(part) => MultiPart::mixed().singlepart(part),
            Body::Multi(part) => MultiPart::mixed().multipart(part),
        };
        for attachment in &message.attachments {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                TransportError::Build(format!(
                    "invalid content type '{}': {e}",
                    attachment.content_type
                ))
            })?;
            mixed = mixed.singlepart(
                MimeAttachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), content_type),
            );
        }
        Body::Multi(mixed)
    };

    let email = match body {
        Body::Single(part) => builder.singlepart(part),
        Body::Multi(part) => builder.multipart(part),
    }
    .map_err(|e| TransportError::Build(e.to_string()))?;

    Ok((email, message_id))
}
