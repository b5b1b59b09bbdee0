//! Request correlation ids.
//!
//! Reuses the `x-request-id` set by an upstream proxy, or mints a UUID v4.
//! The id is recorded on the request span, tagged on the Sentry scope and
//! echoed back in the response.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Incoming id when it is a usable header value, else a fresh UUID.
fn request_id(request: &Request) -> HeaderValue {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .filter(|v| v.to_str().is_ok_and(|s| !s.trim().is_empty()))
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        })
}

pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let id = request_id(&request);
    let id_str = id.to_str().unwrap_or_default().to_owned();

    Span::current().record("request_id", id_str.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &id_str));

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID_HEADER.clone(), id);
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request as HttpRequest, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn test_upstream_id_is_echoed() {
        let request = HttpRequest::builder()
            .uri("/")
            .header("x-request-id", "cf-1234")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("x-request-id").unwrap(), "cf-1234");
    }

    #[tokio::test]
    async fn test_missing_id_is_generated() {
        let request = HttpRequest::builder().uri("/").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        let header = response.headers().get("x-request-id").unwrap();
        assert!(Uuid::parse_str(header.to_str().unwrap()).is_ok());
    }
}
