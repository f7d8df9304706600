//! JSON body extraction for Web API handlers.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::web::error::ApiError;

/// A JSON extractor whose rejection is an [`ApiError`].
///
/// Axum's own `Json` rejects with a plain-text body; this one keeps every
/// failure in the `{ "success": false, "message": ... }` shape. Field
/// validation is left to the handler.
///
/// # Example
///
/// ```ignore
/// async fn send_email(
///     JsonPayload(payload): JsonPayload<EmailPayload>,
/// ) -> Result<Json<SendEmailResponse>, ApiError> {
///     // ...
/// }
/// ```
pub struct JsonPayload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(status = %rejection.status(), "Rejected request body");
                ApiError::from(rejection)
            })?;

        Ok(JsonPayload(value))
    }
}
