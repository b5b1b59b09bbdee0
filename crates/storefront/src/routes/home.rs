//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use super::layout::Layout;
use crate::api::types::CategorySection;
use crate::filters;
use crate::state::AppState;

/// A hero slide. The artwork is static; only the link changes per season.
pub struct HeroSlide {
    pub image: &'static str,
    pub alt: &'static str,
    pub href: &'static str,
}

const HERO_SLIDES: [HeroSlide; 3] = [
    HeroSlide {
        image: "/static/images/hero-men.svg",
        alt: "New season menswear",
        href: "/search?q=men",
    },
    HeroSlide {
        image: "/static/images/hero-women.svg",
        alt: "New season womenswear",
        href: "/search?q=women",
    },
    HeroSlide {
        image: "/static/images/hero-kids.svg",
        alt: "Kidswear essentials",
        href: "/search?q=kids",
    },
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub slides: &'static [HeroSlide],
    /// `None` when the sections failed to load.
    pub sections: Option<Vec<CategorySection>>,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let (layout, sections) = tokio::join!(
        Layout::load(&state, &session),
        state.api().category_sections()
    );

    let sections = match sections {
        Ok(sections) => Some(
            sections
                .into_iter()
                .filter(|s| !s.categories.is_empty())
                .collect(),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load category sections");
            None
        }
    };

    HomeTemplate {
        layout,
        slides: &HERO_SLIDES,
        sections,
    }
}
