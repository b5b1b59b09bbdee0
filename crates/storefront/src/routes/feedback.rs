//! Answers to form posts.
//!
//! A plain form post gets its toasts queued as flash messages and a
//! redirect. An HTMX post gets the toasts inline, plus `HX-Trigger`
//! events for the header badges that should refresh.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{Flash, FlashKind};

/// `HX-Trigger` event refreshing the bag badge.
pub const CART_UPDATED: &str = "cart-updated";

/// `HX-Trigger` event refreshing the wishlist badge.
pub const WISHLIST_UPDATED: &str = "wishlist-updated";

#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Inline toasts, appended to `#toasts`.
#[derive(Template, WebTemplate)]
#[template(path = "partials/toasts.html")]
pub struct ToastsTemplate {
    pub flashes: Vec<Flash>,
}

/// Toasts plus where to go next.
#[must_use]
pub struct Reply {
    flashes: Vec<Flash>,
    redirect: String,
    triggers: Vec<&'static str>,
}

impl Reply {
    pub fn new(kind: FlashKind, message: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            flashes: vec![Flash {
                kind,
                message: message.into(),
            }],
            redirect: redirect.into(),
            triggers: Vec::new(),
        }
    }

    pub fn success(message: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self::new(FlashKind::Success, message, redirect)
    }

    pub fn error(message: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self::new(FlashKind::Error, message, redirect)
    }

    /// Append another toast, if any.
    pub fn and(mut self, flash: Option<Flash>) -> Self {
        self.flashes.extend(flash);
        self
    }

    pub fn trigger(mut self, event: &'static str) -> Self {
        if !self.triggers.contains(&event) {
            self.triggers.push(event);
        }
        self
    }

    pub async fn send(self, session: &Session, headers: &HeaderMap) -> Response {
        if is_htmx(headers) {
            let toasts = ToastsTemplate {
                flashes: self.flashes,
            };
            if self.triggers.is_empty() {
                return toasts.into_response();
            }
            let events = self.triggers.join(", ");
            return (AppendHeaders([("HX-Trigger", events)]), toasts).into_response();
        }

        for flash in self.flashes {
            if let Err(e) = Flash::push(session, flash.kind, flash.message).await {
                tracing::warn!(error = %e, "Failed to queue flash message");
            }
        }
        Redirect::to(&self.redirect).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode, header};
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_form_post_redirects_with_flash() {
        let session = session();
        let response = Reply::success("Cart updated", "/cart")
            .trigger(CART_UPDATED)
            .send(&session, &HeaderMap::new())
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/cart");
        assert!(response.headers().get("HX-Trigger").is_none());

        let flashes = Flash::take(&session).await;
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes.first().map(|f| f.message.as_str()), Some("Cart updated"));
    }

    #[tokio::test]
    async fn test_htmx_post_gets_inline_toast_and_trigger() {
        let session = session();
        let mut headers = HeaderMap::new();
        headers.insert("hx-request", HeaderValue::from_static("true"));

        let response = Reply::error("Please select a size", "/product/p1")
            .and(Some(Flash {
                kind: FlashKind::Info,
                message: "extra".into(),
            }))
            .trigger(CART_UPDATED)
            .send(&session, &headers)
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("HX-Trigger").unwrap(), CART_UPDATED);
        assert!(Flash::take(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_htmx_post_refreshes_both_badges() {
        let session = session();
        let mut headers = HeaderMap::new();
        headers.insert("hx-request", HeaderValue::from_static("true"));

        let response = Reply::success("Moved to bag", "/wishlist")
            .trigger(CART_UPDATED)
            .trigger(WISHLIST_UPDATED)
            .trigger(CART_UPDATED)
            .send(&session, &headers)
            .await;

        assert_eq!(
            response.headers().get("HX-Trigger").unwrap(),
            "cart-updated, wishlist-updated"
        );
    }
}
