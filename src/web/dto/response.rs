//! Response DTOs for Web API.

use serde::Serialize;
use utoipa::ToSchema;

/// Body returned when an email was handed to the SMTP server.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable status.
    pub message: String,
    /// Message identifier assigned by the transport.
    pub message_id: String,
}

impl SendEmailResponse {
    /// Response for a delivered message.
    pub fn sent(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: "Email sent successfully".to_string(),
            message_id: message_id.into(),
        }
    }
}
