//! API handlers for the mailrelay Web API.

pub mod email;

pub use email::*;

use crate::mail::MailRelay;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Relay used for every send request.
    pub relay: MailRelay,
}

impl AppState {
    /// Create a new application state.
    pub fn new(relay: MailRelay) -> Self {
        Self { relay }
    }
}
