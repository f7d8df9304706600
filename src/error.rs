//! Error types for mailrelay.

use thiserror::Error;

use crate::mail::TransportError;

/// Common error type for mailrelay.
///
/// Request-level failures (invalid input, delivery failures) are carried by
/// [`crate::mail::DispatchError`]; this type covers process-level concerns
/// such as startup and configuration.
#[derive(Error, Debug)]
pub enum RelayError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Mail transport error outside of a dispatch (setup or verification).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type alias for mailrelay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
