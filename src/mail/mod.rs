//! Mail module for mailrelay.
//!
//! This module holds the dispatch core:
//! - Request validation (pure, no I/O)
//! - The relay, which makes one delivery attempt per request
//! - The transport abstraction and its SMTP implementation

mod relay;
mod transport;
mod types;
mod validation;

pub use relay::{Delivery, DispatchError, DispatchResult, MailRelay};
pub use transport::{MailTransport, SmtpTransport, TransportError};
pub use types::{
    Attachment, AttachmentPayload, EmailPayload, EmailRequest, OutgoingMessage, Recipients,
};
pub use validation::{not_empty_trimmed, validate, validate_recipients, InvalidInput};
