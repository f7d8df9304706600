//! Web API module for mailrelay.
//!
//! This module exposes the email send endpoint over HTTP, along with a
//! health check, the OpenAPI document and the static form UI.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::{shutdown_signal, WebServer};
