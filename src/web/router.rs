//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::dto::SendEmailResponse;
use super::error::ErrorBody;
use super::handlers::{self, send_email, AppState};
use super::middleware::{create_cors_layer, security_headers};
use crate::config::WebConfig;
use crate::mail::{AttachmentPayload, EmailPayload, Recipients};

/// OpenAPI document for the Web API.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::email::send_email),
    components(schemas(
        EmailPayload,
        AttachmentPayload,
        Recipients,
        SendEmailResponse,
        ErrorBody
    )),
    tags((name = "email", description = "Email relay"))
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, web_config: &WebConfig) -> Router {
    let email_routes = Router::new().route("/send", post(send_email));

    let api_routes = Router::new().nest("/email", email_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(web_config.max_body_size_bytes()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&web_config.cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Create a router serving the form UI from `static_path`.
///
/// Returns `None` when the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    if !Path::new(static_path).is_dir() {
        tracing::warn!("Static directory not found: {}", static_path);
        return None;
    }
    Some(Router::new().fallback_service(ServeDir::new(static_path)))
}
