//! Request validation.
//!
//! The single authoritative check on a send payload: non-empty `to`,
//! non-empty `subject`, and at least one non-empty body (`text` or `html`),
//! all after trimming. Attachments must be decodable. Nothing here performs
//! I/O.

use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use validator::{Validate, ValidationError, ValidationErrors};

use super::types::{Attachment, AttachmentPayload, EmailPayload, EmailRequest, Recipients};

/// A rejected payload, with messages per failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInput {
    fields: BTreeMap<String, Vec<String>>,
}

impl InvalidInput {
    /// Messages keyed by field name.
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// Whether `field` failed validation.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Take the field messages.
    pub fn into_fields(self) -> BTreeMap<String, Vec<String>> {
        self.fields
    }
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        write!(f, "invalid input: {}", names.join(", "))
    }
}

impl std::error::Error for InvalidInput {}

impl From<ValidationErrors> for InvalidInput {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }

        Self { fields }
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("not_empty_trimmed", "Must not be empty"));
    }
    Ok(())
}

/// Validate the recipient field: at least one entry, none blank.
///
/// Entries may hold comma-separated address lists; every item between
/// commas must be non-blank as well.
pub fn validate_recipients(to: &Recipients) -> Result<(), ValidationError> {
    match to {
        Recipients::One(address) if address.trim().is_empty() => {
            Err(error("required", "Recipient is required"))
        }
        Recipients::Many(addresses) if addresses.is_empty() => {
            Err(error("required", "At least one recipient is required"))
        }
        _ => {
            if to
                .iter()
                .flat_map(|entry| entry.split(','))
                .any(|a| a.trim().is_empty())
            {
                return Err(error("blank_recipient", "Recipients must not be blank"));
            }
            Ok(())
        }
    }
}

fn has_content(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Validate for EmailPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_recipients(&self.to) {
            errors.add("to", e);
        }
        if not_empty_trimmed(&self.subject).is_err() {
            errors.add("subject", error("required", "Subject is required"));
        }
        if !has_content(&self.text) && !has_content(&self.html) {
            errors.add(
                "text",
                error("body_required", "Either text or html body is required"),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Decode an attachment descriptor into raw bytes and a content type.
fn decode_attachment(payload: AttachmentPayload) -> Result<Attachment, ValidationError> {
    let filename = payload.filename.trim().to_string();
    if filename.is_empty() {
        return Err(error("filename", "Attachment filename is required"));
    }

    let content = match payload.encoding.as_deref().map(str::to_ascii_lowercase) {
        None => payload.content.into_bytes(),
        Some(encoding) if encoding == "utf-8" || encoding == "utf8" => {
            payload.content.into_bytes()
        }
        Some(encoding) if encoding == "base64" => BASE64
            .decode(payload.content.trim())
            .map_err(|_| error("base64", "Attachment content is not valid base64"))?,
        Some(_) => {
            return Err(error(
                "encoding",
                "Attachment encoding must be base64 or utf-8",
            ))
        }
    };

    let content_type = match payload.content_type {
        Some(ct) => {
            let ct = ct.trim();
            ct.parse::<mime_guess::Mime>()
                .map_err(|_| error("content_type", "Attachment contentType is not a MIME type"))?;
            ct.to_string()
        }
        None => mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string(),
    };

    Ok(Attachment {
        filename,
        content,
        content_type,
    })
}

/// Validate a raw payload.
///
/// On success the returned request holds the trimmed field values and
/// decoded attachments; blank bodies become `None`. On failure every failing
/// field is reported, not just the first.
pub fn validate(payload: EmailPayload) -> Result<EmailRequest, InvalidInput> {
    let mut errors = match payload.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    let mut attachments = Vec::with_capacity(payload.attachments.len());
    for attachment in payload.attachments {
        match decode_attachment(attachment) {
            Ok(decoded) => attachments.push(decoded),
            Err(e) => errors.add("attachments", e),
        }
    }

    if !errors.is_empty() {
        return Err(errors.into());
    }

    let to = payload.to.iter().map(|a| a.trim().to_string()).collect();

    Ok(EmailRequest {
        to,
        subject: payload.subject.trim().to_string(),
        text: trimmed(payload.text),
        html: trimmed(payload.html),
        attachments,
    })
}
