//! Authentication route handlers.
//!
//! Login and registration share one page. Password resets go through the
//! emailed link, which carries `token` and `email` query parameters.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use macstorm_core::Email;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::Layout;
use crate::api::SessionToken;
use crate::api::types::{Credentials, PasswordReset, Registration};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::models::Flash;
use crate::models::session::{log_in, log_out};
use crate::state::AppState;

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const LOGIN_FAILED: &str = "Failed to login";
pub const REGISTER_SUCCESS: &str = "Account created successfully! You can now login.";
pub const REGISTER_FAILED: &str = "Failed to sign up";
pub const LOGGED_OUT: &str = "Logged out successfully";
pub const RESET_LINK_SENT: &str = "Password reset link sent!";
pub const RESET_LINK_RESENT: &str = "Reset link resent successfully!";
pub const RESET_LINK_FAILED: &str = "Failed to send reset link";
pub const RESET_LINK_INVALID: &str = "Invalid or missing reset link parameters";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long";
pub const PASSWORD_RESET: &str = "Password reset successfully!";
pub const PASSWORD_RESET_FAILED: &str = "Failed to reset password";
pub const FIELDS_REQUIRED: &str = "Please fill in all fields";

pub const MIN_PASSWORD_LENGTH: usize = 6;

const LOGIN_PATH: &str = "/login";

/// Check a new password and its confirmation.
///
/// # Errors
///
/// Returns the message to show when they differ or the password is short.
pub fn check_new_password(
    password: &str,
    confirm: &str,
) -> std::result::Result<(), &'static str> {
    if password != confirm {
        return Err(PASSWORD_MISMATCH);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PASSWORD_TOO_SHORT);
    }
    Ok(())
}

/// Parameters carried by an emailed reset link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetLink {
    pub token: String,
    pub email: String,
}

/// The reset link's parameters, when both are present.
#[must_use]
pub fn reset_link(token: Option<&str>, email: Option<&str>) -> Option<ResetLink> {
    let token = token.map(str::trim).filter(|t| !t.is_empty())?;
    let email = email.map(str::trim).filter(|e| !e.is_empty())?;
    Some(ResetLink {
        token: token.to_owned(),
        email: email.to_owned(),
    })
}

// =============================================================================
// Form Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub email: String,
    /// Set by the "resend" button on the confirmation screen.
    #[serde(default)]
    pub resend: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

// =============================================================================
// Query Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// `register` opens the sign-up form.
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    pub token: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login and sign-up page.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub register: bool,
    pub error: Option<String>,
    pub email: String,
    pub full_name: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub layout: Layout,
    pub error: Option<String>,
    /// Set once a link has gone out; shows the confirmation screen.
    pub sent_to: Option<String>,
    pub email: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub layout: Layout,
    /// `None` when the link is missing its parameters.
    pub link: Option<ResetLink>,
    pub error: Option<String>,
}

// =============================================================================
// Login / Registration
// =============================================================================

pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        layout: Layout::load(&state, &session).await,
        register: query.mode.as_deref() == Some("register"),
        error: None,
        email: String::new(),
        full_name: String::new(),
    }
}

/// `/register` is the sign-up mode of the login page.
pub async fn register_page() -> Redirect {
    Redirect::to("/login?mode=register")
}

async fn login_failure(
    state: &AppState,
    session: &Session,
    register: bool,
    error: String,
    email: String,
    full_name: String,
) -> Response {
    let page = LoginTemplate {
        layout: Layout::load(state, session).await,
        register,
        error: Some(error),
        email,
        full_name,
    };
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

/// Exchange credentials for a session.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim().to_owned();
    if email.is_empty() || form.password.expose_secret().is_empty() {
        return Ok(login_failure(
            &state,
            &session,
            false,
            FIELDS_REQUIRED.into(),
            email,
            String::new(),
        )
        .await);
    }

    let credentials = Credentials {
        email: email.clone(),
        password: form.password.expose_secret().to_owned(),
    };
    let response = match state.api().login(&credentials).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let message = e.user_message(LOGIN_FAILED);
            return Ok(
                login_failure(&state, &session, false, message, email, String::new()).await,
            );
        }
    };

    if SessionToken::parse(&response.token).is_none() {
        tracing::error!("Login response carried a malformed token");
        return Ok(login_failure(
            &state,
            &session,
            false,
            LOGIN_FAILED.into(),
            email,
            String::new(),
        )
        .await);
    }

    log_in(&session, &response.token, &response.user).await?;
    set_sentry_user(
        response.user.id.as_ref().map(|id| id.as_str()),
        response.user.email.as_deref(),
    );
    tracing::info!("Shopper logged in");

    Flash::success(&session, LOGIN_SUCCESS).await?;
    Ok(Redirect::to("/").into_response())
}

/// Create an account, then send the shopper to log in.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let full_name = form.full_name.trim().to_owned();
    let raw_email = form.email.trim().to_owned();

    if full_name.is_empty() || form.password.expose_secret().is_empty() {
        return Ok(login_failure(
            &state,
            &session,
            true,
            FIELDS_REQUIRED.into(),
            raw_email,
            full_name,
        )
        .await);
    }
    let email = match Email::parse(&raw_email) {
        Ok(email) => email,
        Err(e) => {
            return Ok(
                login_failure(&state, &session, true, e.to_string(), raw_email, full_name).await,
            );
        }
    };

    let registration = Registration {
        full_name: full_name.clone(),
        email: email.to_string(),
        password: form.password.expose_secret().to_owned(),
    };
    if let Err(e) = state.api().register(&registration).await {
        tracing::warn!(error = %e, "Registration failed");
        let message = e.user_message(REGISTER_FAILED);
        return Ok(login_failure(&state, &session, true, message, raw_email, full_name).await);
    }

    tracing::info!("Shopper registered");
    Flash::success(&session, REGISTER_SUCCESS).await?;
    Ok(Redirect::to(LOGIN_PATH).into_response())
}

/// Clear the shopper from the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    log_out(&session).await?;
    clear_sentry_user();
    Flash::info(&session, LOGGED_OUT).await?;
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Password Reset
// =============================================================================

pub async fn forgot_password_page(
    State(state): State<AppState>,
    session: Session,
) -> impl IntoResponse {
    ForgotPasswordTemplate {
        layout: Layout::load(&state, &session).await,
        error: None,
        sent_to: None,
        email: String::new(),
    }
}

/// Send, or resend, the reset link.
#[instrument(skip(state, session, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Response> {
    let email = form.email.trim().to_owned();
    let outcome = match Email::parse(&email) {
        Ok(parsed) => state
            .api()
            .request_password_reset(parsed.as_str())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Reset link request failed");
                e.user_message(RESET_LINK_FAILED)
            }),
        Err(e) => Err(e.to_string()),
    };

    let (error, sent_to) = match outcome {
        Ok(_) => {
            let message = if form.resend {
                RESET_LINK_RESENT
            } else {
                RESET_LINK_SENT
            };
            Flash::success(&session, message).await?;
            (None, Some(email.clone()))
        }
        Err(message) => (Some(message), form.resend.then(|| email.clone())),
    };

    let page = ForgotPasswordTemplate {
        layout: Layout::load(&state, &session).await,
        error,
        sent_to,
        email,
    };
    Ok(page.into_response())
}

pub async fn reset_password_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ResetQuery>,
) -> impl IntoResponse {
    let link = reset_link(query.token.as_deref(), query.email.as_deref());
    let error = link.is_none().then(|| RESET_LINK_INVALID.to_string());
    ResetPasswordTemplate {
        layout: Layout::load(&state, &session).await,
        link,
        error,
    }
}

/// Set a new password from the emailed link.
#[instrument(skip(state, session, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response> {
    let link = reset_link(Some(&form.token), Some(&form.email));
    let checked = match &link {
        None => Err(RESET_LINK_INVALID.to_string()),
        Some(_) => check_new_password(
            form.password.expose_secret(),
            form.confirm_password.expose_secret(),
        )
        .map_err(str::to_owned),
    };

    let failure = match (checked, &link) {
        (Ok(()), Some(link)) => {
            let reset = PasswordReset {
                email: link.email.clone(),
                token: link.token.clone(),
                new_password: form.password.expose_secret().to_owned(),
            };
            match state.api().reset_password(&reset).await {
                Ok(_) => {
                    tracing::info!("Password reset");
                    Flash::success(&session, PASSWORD_RESET).await?;
                    return Ok(Redirect::to(LOGIN_PATH).into_response());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Password reset failed");
                    e.user_message(PASSWORD_RESET_FAILED)
                }
            }
        }
        (Err(message), _) => message,
        (Ok(()), None) => RESET_LINK_INVALID.to_string(),
    };

    let page = ResetPasswordTemplate {
        layout: Layout::load(&state, &session).await,
        link,
        error: Some(failure),
    };
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_new_password() {
        assert_eq!(check_new_password("secret1", "secret2"), Err(PASSWORD_MISMATCH));
        assert_eq!(check_new_password("abc", "abc"), Err(PASSWORD_TOO_SHORT));
        assert_eq!(check_new_password("abcdef", "abcdef"), Ok(()));
    }

    #[test]
    fn test_mismatch_reported_before_length() {
        assert_eq!(check_new_password("a", "b"), Err(PASSWORD_MISMATCH));
    }

    #[test]
    fn test_reset_link_needs_both_parameters() {
        assert_eq!(
            reset_link(Some("tok"), Some("a@b.co")),
            Some(ResetLink {
                token: "tok".to_string(),
                email: "a@b.co".to_string(),
            })
        );
        assert_eq!(reset_link(Some("tok"), None), None);
        assert_eq!(reset_link(None, Some("a@b.co")), None);
        assert_eq!(reset_link(Some("  "), Some("a@b.co")), None);
    }
}
