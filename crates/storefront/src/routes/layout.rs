//! Data every full page needs: the navigation menu, header badges, toasts
//! and the search box.

use askama::Template;
use askama_web::WebTemplate;
use tower_sessions::Session;

use crate::api::types::{Navigation, User};
use crate::models::session::current_user;
use crate::models::{Badges, Flash, RecentSearches};
use crate::state::AppState;

/// Header badge fragment. It refreshes itself on `event`, never on load,
/// so a swap does not re-trigger the fetch.
#[derive(Template, WebTemplate)]
#[template(path = "partials/badge.html")]
pub struct BadgeTemplate {
    pub count: usize,
    pub endpoint: &'static str,
    pub event: &'static str,
}

/// Shared chrome rendered by `base.html`.
pub struct Layout {
    /// `None` when the menu failed to load; the page still renders.
    pub nav: Option<Navigation>,
    pub badges: Badges,
    pub flashes: Vec<Flash>,
    pub user: Option<User>,
    /// Search box prefill.
    pub query: String,
    pub recent: RecentSearches,
}

impl Layout {
    /// Load the chrome for a page. Drains queued toasts.
    pub async fn load(state: &AppState, session: &Session) -> Self {
        let nav = match state.api().navigation().await {
            Ok(nav) => Some(nav),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load navigation");
                None
            }
        };
        let user = current_user(session).await;
        let badges = if user.is_some() {
            Badges::load(session).await
        } else {
            Badges::default()
        };

        Self {
            nav,
            badges,
            flashes: Flash::take(session).await,
            user,
            query: String::new(),
            recent: RecentSearches::load(session).await,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        query.trim().clone_into(&mut self.query);
        self
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}
