//! Mail relay: one delivery attempt per validated request.

use std::sync::Arc;

use thiserror::Error;

use super::transport::{MailTransport, TransportError};
use super::types::{EmailPayload, EmailRequest, OutgoingMessage};
use super::validation::{validate, InvalidInput};

/// A successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Message identifier assigned by the transport.
    pub message_id: String,
}

/// A failed dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The payload was rejected before any transport call.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    /// The transport failed to deliver.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DispatchError {
    /// Message suitable for showing to the caller.
    pub fn user_message(&self) -> &'static str {
        match self {
            DispatchError::InvalidInput(_) => "Invalid input",
            DispatchError::Transport(_) => "Failed to send email",
        }
    }
}

/// Outcome of a dispatch.
pub type DispatchResult = std::result::Result<Delivery, DispatchError>;

/// Relays validated requests through a mail transport.
///
/// Holds no per-request state; clones share the same transport.
#[derive(Clone)]
pub struct MailRelay {
    transport: Arc<dyn MailTransport>,
    sender: String,
}

impl MailRelay {
    /// Create a relay that sends as `sender` through `transport`.
    pub fn new(transport: Arc<dyn MailTransport>, sender: impl Into<String>) -> Self {
        Self {
            transport,
            sender: sender.into(),
        }
    }

    /// The configured sender address.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Validate a raw payload and dispatch it.
    ///
    /// Invalid payloads never reach the transport.
    pub async fn send(&self, payload: EmailPayload) -> DispatchResult {
        let request = validate(payload).map_err(|e| {
            tracing::debug!(error = %e, "Rejected email request");
            e
        })?;
        self.dispatch(request).await
    }

    /// Make exactly one delivery attempt for `request`.
    ///
    /// Transport failures are returned unchanged; nothing is retried.
    pub async fn dispatch(&self, request: EmailRequest) -> DispatchResult {
        let message = OutgoingMessage::new(&self.sender, request);
        let recipients = message.to.len();

        match self.transport.send(&message).await {
            Ok(message_id) => {
                tracing::info!(
                    message_id = %message_id,
                    recipients,
                    attachments = message.attachments.len(),
                    "Email sent"
                );
                Ok(Delivery { message_id })
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, recipients, "Failed to send email");
                Err(DispatchError::Transport(e))
            }
        }
    }

    /// Check that the transport can reach its server.
    pub async fn verify(&self) -> Result<(), TransportError> {
        self.transport.verify().await
    }
}
