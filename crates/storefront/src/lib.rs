//! MacStorm storefront library.
//!
//! Server-rendered pages and HTMX fragments over the MacStorm commerce API.
//! The binary in `main.rs` wires these modules into a running server; the
//! library split lets handlers and the API client be tested directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod addresses;
pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod orders;
pub mod reviews;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Reads the navigation menu, which is cached, so a warm instance answers
/// without touching the API. Returns 503 if the API cannot be reached.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().navigation().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// The full application router, minus the Sentry layers.
///
/// # Errors
///
/// Returns an error if the session secret cannot derive a signing key.
pub fn app(
    state: AppState,
    static_dir: &str,
) -> Result<Router, tower_sessions::cookie::KeyError> {
    let session_layer = middleware::create_session_layer(state.config())?;

    Ok(Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state))
}
