//! Client for the MacStorm commerce REST API.
//!
//! # Architecture
//!
//! - The backend is the source of truth for products, carts, orders and
//!   payments. No local sync, direct API calls.
//! - Navigation and home page sections are cached in memory via `moka`
//!   (5 minute TTL).
//! - One request per call. No retries.
//!
//! # Example
//!
//! ```rust,ignore
//! use macstorm_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let product = client.product(&product_id).await?;
//! let cart = client.cart(Some(&token)).await?;
//! ```

mod account;
mod cache;
mod cart;
mod catalog;
mod client;
pub mod de;
mod orders;
mod reviews;
pub mod types;

use std::fmt;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub use catalog::AUTOCOMPLETE_LIMIT;
pub use client::ApiClient;
pub use reviews::{MAX_REVIEW_IMAGES, NewReview};
pub use types::*;

/// Errors returned by [`ApiClient`] calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connect, timeout, or an unreadable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API returned {status}: {}", .body.message.as_deref().unwrap_or("(no message)"))]
    Status { status: StatusCode, body: ApiErrorBody },

    /// A 2xx response whose envelope says `success: false`.
    #[error("API rejected request: {}", .0.message.as_deref().unwrap_or("(no message)"))]
    Rejected(ApiErrorBody),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint path could not be joined to the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Coarse classification used to pick the message shown to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CouponAlreadyUsed,
    Coupon,
    Unauthorized,
    NotFound,
    Timeout,
    Network,
    Decode,
    Other,
}

/// The error document the backend sends alongside a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "errorType")]
    pub error_type: Option<String>,
}

impl ApiErrorBody {
    fn coupon_kind(&self) -> Option<ErrorKind> {
        let already_used = self.error_type.as_deref() == Some("COUPON_ALREADY_USED")
            || self
                .message
                .as_deref()
                .is_some_and(|m| m.to_lowercase().contains("already used"));
        if already_used {
            return Some(ErrorKind::CouponAlreadyUsed);
        }
        (self.error_type.as_deref() == Some("COUPON_ERROR")).then_some(ErrorKind::Coupon)
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }
}

impl ApiError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::Http(e) if e.is_decode() => ErrorKind::Decode,
            Self::Http(_) => ErrorKind::Network,
            Self::Status { status, body } => {
                if let Some(kind) = body.coupon_kind() {
                    return kind;
                }
                match *status {
                    StatusCode::UNAUTHORIZED => ErrorKind::Unauthorized,
                    StatusCode::NOT_FOUND => ErrorKind::NotFound,
                    _ => ErrorKind::Other,
                }
            }
            Self::Rejected(body) => body.coupon_kind().unwrap_or(ErrorKind::Other),
            Self::Parse(_) => ErrorKind::Decode,
            Self::Url(_) => ErrorKind::Other,
        }
    }

    /// The backend's own message when it sent one, else `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { body, .. } | Self::Rejected(body) => body.message(),
            _ => None,
        }
        .unwrap_or(fallback)
        .to_string()
    }

    /// Transport failures where the backend never answered.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::Network | ErrorKind::Timeout)
    }
}

/// Bearer token issued by `/auth/login`.
///
/// Only JWT-shaped values (three non-empty dot-separated segments) are
/// accepted; anything else is treated as logged out.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let mut segments = raw.split('.');
        let well_formed = segments.by_ref().take(3).filter(|s| !s.is_empty()).count() == 3
            && segments.next().is_none();
        well_formed.then(|| Self(SecretString::from(raw.to_owned())))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status(status: StatusCode, message: Option<&str>, error_type: Option<&str>) -> ApiError {
        ApiError::Status {
            status,
            body: ApiErrorBody {
                message: message.map(String::from),
                error_type: error_type.map(String::from),
            },
        }
    }

    #[test]
    fn test_coupon_already_used_by_type() {
        let err = status(StatusCode::BAD_REQUEST, None, Some("COUPON_ALREADY_USED"));
        assert_eq!(err.kind(), ErrorKind::CouponAlreadyUsed);
    }

    #[test]
    fn test_coupon_already_used_by_message() {
        let err = status(
            StatusCode::BAD_REQUEST,
            Some("You have Already Used this coupon"),
            None,
        );
        assert_eq!(err.kind(), ErrorKind::CouponAlreadyUsed);
    }

    #[test]
    fn test_coupon_error_type() {
        let err = status(StatusCode::BAD_REQUEST, Some("Expired"), Some("COUPON_ERROR"));
        assert_eq!(err.kind(), ErrorKind::Coupon);
        assert_eq!(err.user_message("fallback"), "Expired");
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(
            status(StatusCode::UNAUTHORIZED, None, None).kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            status(StatusCode::NOT_FOUND, None, None).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            status(StatusCode::INTERNAL_SERVER_ERROR, None, None).kind(),
            ErrorKind::Other
        );
    }

    #[test]
    fn test_rejected_envelope() {
        let err = ApiError::Rejected(ApiErrorBody {
            message: Some("coupon already used".into()),
            error_type: None,
        });
        assert_eq!(err.kind(), ErrorKind::CouponAlreadyUsed);
        assert_eq!(err.user_message("x"), "coupon already used");
    }

    #[test]
    fn test_user_message_fallback() {
        let err = status(StatusCode::BAD_GATEWAY, Some("   "), None);
        assert_eq!(err.user_message("Failed to load"), "Failed to load");

        let err = ApiError::Parse(serde_json::from_str::<u32>("x").unwrap_err());
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.user_message("Failed to load"), "Failed to load");
    }

    #[test]
    fn test_error_body_field_names() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message":"nope","errorType":"COUPON_ERROR"}"#).unwrap();
        assert_eq!(body.error_type.as_deref(), Some("COUPON_ERROR"));
    }

    #[test]
    fn test_session_token_shape() {
        assert!(SessionToken::parse("aaa.bbb.ccc").is_some());
        assert!(SessionToken::parse("aaa.bbb").is_none());
        assert!(SessionToken::parse("aaa..ccc").is_none());
        assert!(SessionToken::parse("a.b.c.d").is_none());
        assert!(SessionToken::parse("").is_none());
    }

    #[test]
    fn test_session_token_debug_redacted() {
        let token = SessionToken::parse("secret.jwt.value").unwrap();
        assert!(!format!("{token:?}").contains("secret"));
        assert_eq!(token.expose(), "secret.jwt.value");
    }
}
