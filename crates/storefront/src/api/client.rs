//! HTTP plumbing shared by every endpoint.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, ApiErrorBody, SessionToken};
use crate::config::ApiConfig;

/// Bodies longer than this are cut when logged.
const LOG_BODY_LIMIT: usize = 500;

pub(super) fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the MacStorm commerce API.
///
/// Cheap to clone. Navigation and home page sections are cached for
/// 5 minutes; everything else goes to the backend on every call.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("macstorm-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    pub(super) fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }

    /// Build a request for `path`, relative to the API base.
    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SessionToken>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        let builder = self.inner.client.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    /// Send a request and decode the response envelope.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_owned();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                path = %url,
                body = %truncate(&response_text),
                "MacStorm API returned non-success status"
            );
            let body = serde_json::from_str::<ApiErrorBody>(&response_text).unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        // An empty 2xx body reads as an empty object so acknowledgements decode
        let value: serde_json::Value = if response_text.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&response_text).map_err(|e| {
                tracing::error!(
                    error = %e,
                    path = %url,
                    body = %truncate(&response_text),
                    "Failed to parse MacStorm API response"
                );
                ApiError::Parse(e)
            })?
        };

        if value.get("success").and_then(serde_json::Value::as_bool) == Some(false) {
            tracing::debug!(path = %url, body = %truncate(&response_text), "API envelope reported failure");
            let body = serde_json::from_value::<ApiErrorBody>(value).unwrap_or_default();
            return Err(ApiError::Rejected(body));
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %url,
                body = %truncate(&response_text),
                "MacStorm API response has an unexpected shape"
            );
            ApiError::Parse(e)
        })
    }

    pub(super) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path, token)?).await
    }

    pub(super) async fn get_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.request(Method::GET, path, token)?.query(query))
            .await
    }

    pub(super) async fn send_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(method, path, token)?.json(body))
            .await
    }

    pub(super) async fn post_json<T, B>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, body, token).await
    }

    pub(super) async fn put_json<T, B>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, path, body, token).await
    }

    pub(super) async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError> {
        self.execute(self.request(Method::DELETE, path, token)?)
            .await
    }

    pub(super) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        token: Option<&SessionToken>,
    ) -> Result<T, ApiError> {
        self.execute(self.request(Method::POST, path, token)?.multipart(form))
            .await
    }
}

/// Percent-encode an id for use as a path segment.
pub(super) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(LOG_BODY_LIMIT + 50);
        assert_eq!(truncate(&body).len(), LOG_BODY_LIMIT);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_segment_encodes() {
        assert_eq!(segment("abc123"), "abc123");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_request_keeps_api_prefix() {
        let config = ApiConfig::new("https://backend.example.com/api", Duration::from_secs(5)).unwrap();
        let client = ApiClient::new(&config).unwrap();
        let request = client
            .request(Method::GET, "/cart", None)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "https://backend.example.com/api/cart");
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_request_sets_bearer() {
        let config = ApiConfig::new("https://backend.example.com/api/", Duration::from_secs(5)).unwrap();
        let client = ApiClient::new(&config).unwrap();
        let token = SessionToken::parse("a.b.c").unwrap();
        let request = client
            .request(Method::GET, "wishlist", Some(&token))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer a.b.c"
        );
    }
}
