//! Authentication extractors.
//!
//! A shopper is logged in when the session holds a JWT-shaped token and a
//! profile. Handlers that need the backend's bearer token take
//! [`RequireAuth`]; pages that merely adapt to the shopper take
//! [`OptionalAuth`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::api::SessionToken;
use crate::api::types::User;
use crate::models::session;

/// The logged-in shopper.
#[derive(Debug, Clone)]
pub struct Shopper {
    pub token: SessionToken,
    pub user: User,
}

/// Extractor that requires a logged-in shopper.
///
/// Redirects page requests to `/login`. HTMX requests get a 401 carrying
/// `HX-Redirect` so the swap target does not fill with the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireAuth(shopper): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", shopper.user.first_name())
/// }
/// ```
pub struct RequireAuth(pub Shopper);

/// Error returned when authentication is required but the shopper is not
/// logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for HTMX fragments).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => {
                (StatusCode::UNAUTHORIZED, [("HX-Redirect", "/login")]).into_response()
            }
        }
    }
}

async fn shopper(session: &Session) -> Option<Shopper> {
    let token = session::token(session).await?;
    let user = session::current_user(session).await?;
    Some(Shopper { token, user })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_fragment = parts.headers.contains_key("hx-request");
        let rejection = || {
            if is_fragment {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        };

        let session = parts.extensions.get::<Session>().ok_or_else(rejection)?;
        shopper(session).await.map(Self).ok_or_else(rejection)
    }
}

/// Extractor that optionally gets the logged-in shopper.
///
/// Never rejects.
pub struct OptionalAuth(pub Option<Shopper>);

impl OptionalAuth {
    /// Bearer token for API calls, when logged in.
    #[must_use]
    pub fn token(&self) -> Option<&SessionToken> {
        self.0.as_ref().map(|s| &s.token)
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let shopper = match parts.extensions.get::<Session>() {
            Some(session) => shopper(session).await,
            None => None,
        };

        Ok(Self(shopper))
    }
}
