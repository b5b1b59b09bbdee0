//! Static content pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;

use super::layout::Layout;
use crate::filters;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub layout: Layout,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/return_policy.html")]
pub struct ReturnPolicyTemplate {
    pub layout: Layout,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/terms.html")]
pub struct TermsTemplate {
    pub layout: Layout,
}

#[derive(Template, WebTemplate)]
#[template(path = "pages/privacy.html")]
pub struct PrivacyTemplate {
    pub layout: Layout,
}

pub async fn about(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    AboutTemplate {
        layout: Layout::load(&state, &session).await,
    }
}

pub async fn return_policy(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    ReturnPolicyTemplate {
        layout: Layout::load(&state, &session).await,
    }
}

pub async fn terms(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    TermsTemplate {
        layout: Layout::load(&state, &session).await,
    }
}

pub async fn privacy(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    PrivacyTemplate {
        layout: Layout::load(&state, &session).await,
    }
}
