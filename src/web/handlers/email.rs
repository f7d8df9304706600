//! Email handlers for Web API.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::mail::EmailPayload;
use crate::web::dto::{JsonPayload, SendEmailResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/email/send - Validate and relay an email.
#[utoipa::path(
    post,
    path = "/api/email/send",
    tag = "email",
    request_body = EmailPayload,
    responses(
        (status = 200, description = "Email handed to the SMTP server", body = SendEmailResponse),
        (status = 400, description = "Invalid input or malformed JSON", body = ErrorBody),
        (status = 500, description = "SMTP transport failure", body = ErrorBody)
    )
)]
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    JsonPayload(payload): JsonPayload<EmailPayload>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let delivery = state.relay.send(payload).await?;
    Ok(Json(SendEmailResponse::sent(delivery.message_id)))
}
