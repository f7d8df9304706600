//! mailrelay - HTTP to SMTP email relay
//!
//! Accepts email send requests as JSON over HTTP, validates them and relays
//! each one through a configured SMTP server.

pub mod config;
pub mod error;
pub mod logging;
pub mod mail;
pub mod web;

pub use config::Config;
pub use error::{RelayError, Result};
pub use mail::{
    Delivery, DispatchError, EmailPayload, EmailRequest, InvalidInput, MailRelay, MailTransport,
    OutgoingMessage, Recipients, SmtpTransport, TransportError,
};
pub use web::WebServer;
