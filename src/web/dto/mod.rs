//! Data Transfer Objects for Web API.

pub mod json;
pub mod response;

pub use json::JsonPayload;
pub use response::*;
