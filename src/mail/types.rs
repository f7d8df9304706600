//! Mail types for mailrelay.

use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

/// Deserialize a field, treating an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Recipient field as sent by callers: one address string or a list.
///
/// A single string may itself hold several comma-separated addresses; it is
/// passed through as-is and split by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Recipients {
    /// A single address (or comma-separated address list).
    One(String),
    /// A list of addresses.
    Many(Vec<String>),
}

impl Default for Recipients {
    fn default() -> Self {
        Recipients::One(String::new())
    }
}

impl Recipients {
    /// Iterate over the raw recipient entries.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let entries: &[String] = match self {
            Recipients::One(address) => std::slice::from_ref(address),
            Recipients::Many(addresses) => addresses,
        };
        entries.iter().map(String::as_str)
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Recipients::One(address.to_string())
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        Recipients::Many(addresses)
    }
}

/// Attachment descriptor as sent by callers.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentPayload {
    /// File name shown to the recipient.
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    /// File content, encoded as described by `encoding`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// "base64", or "utf-8" / absent for plain text content.
    #[serde(default)]
    pub encoding: Option<String>,
    /// MIME type. Guessed from the file name when absent.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Raw email send payload, before validation.
///
/// Every field is defaulted so that a missing field is reported as invalid
/// input rather than as a malformed body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EmailPayload {
    /// Recipient address or addresses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: Recipients,
    /// Subject line.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    /// Plain text body.
    #[serde(default)]
    pub text: Option<String>,
    /// HTML body.
    #[serde(default)]
    pub html: Option<String>,
    /// Attachments, in order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: Vec<AttachmentPayload>,
}

/// A decoded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name.
    pub filename: String,
    /// Raw content bytes.
    pub content: Vec<u8>,
    /// MIME type, e.g. "application/pdf".
    pub content_type: String,
}

/// A validated email request.
///
/// Only [`crate::mail::validate`] produces these, so `to` and `subject` are
/// non-empty and at least one of `text` / `html` is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRequest {
    /// Recipient entries, trimmed.
    pub to: Vec<String>,
    /// Subject line, trimmed.
    pub subject: String,
    /// Plain text body, trimmed.
    pub text: Option<String>,
    /// HTML body, trimmed.
    pub html: Option<String>,
    /// Decoded attachments.
    pub attachments: Vec<Attachment>,
}

/// The message handed to a [`crate::mail::MailTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Sender address.
    pub from: String,
    /// Recipient entries.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub text: Option<String>,
    /// HTML body.
    pub html: Option<String>,
    /// Attachments.
    pub attachments: Vec<Attachment>,
}

impl OutgoingMessage {
    /// Build an outgoing message from a validated request.
    pub fn new(from: impl Into<String>, request: EmailRequest) -> Self {
        Self {
            from: from.into(),
            to: request.to,
            subject: request.subject,
            text: request.text,
            html: request.html,
            attachments: request.attachments,
        }
    }
}
