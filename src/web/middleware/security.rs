//! Security headers middleware.

use axum::{
    body::Body,
    http::{
        header::{self, HeaderName, HeaderValue},
        Request,
    },
    middleware::Next,
    response::Response,
};

/// Headers added to every response.
const SECURITY_HEADERS: [(HeaderName, &str); 3] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
];

/// Security headers middleware.
///
/// Adds `X-Content-Type-Options`, `X-Frame-Options` and `Referrer-Policy`
/// to all responses, and `Cache-Control: no-store` unless the handler set
/// its own cache policy. Send results must never be served from a cache.
pub async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    if !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        );
    }

    response
}
