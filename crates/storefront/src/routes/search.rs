//! Search results and the search-as-you-type fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::cards::{ProductCard, cards};
use super::layout::Layout;
use super::listing::FilterPanel;
use crate::api::AUTOCOMPLETE_LIMIT;
use crate::api::types::{Autocomplete, Suggestion};
use crate::catalog::{FilterFacets, FilterQuery, ProductFilters, SortOrder};
use crate::filters;
use crate::models::RecentSearches;
use crate::state::AppState;

/// Autocomplete only fires past this many characters.
const MIN_SUGGEST_CHARS: usize = 1;

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub layout: Layout,
    pub query: String,
    /// `None` when the search call failed.
    pub products: Option<Vec<ProductCard>>,
    pub panel: FilterPanel,
}

/// Display search results.
///
/// A missing query renders an empty page without calling the API.
#[instrument(skip(state, session, params))]
pub async fn results(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<FilterQuery>,
) -> Response {
    let filters = ProductFilters::from_query(&params);
    let sort = SortOrder::parse(params.sort.as_deref().unwrap_or_default());
    let term = params.term().map(str::to_owned);

    let Some(term) = term else {
        let layout = Layout::load(&state, &session).await;
        return SearchTemplate {
            layout,
            query: String::new(),
            products: Some(Vec::new()),
            panel: FilterPanel::build("/search", None, &filters, &FilterFacets::default(), sort),
        }
        .into_response();
    };

    if let Err(e) = RecentSearches::remember(&session, &term).await {
        tracing::warn!(error = %e, "Failed to record recent search");
    }

    let (layout, found) = tokio::join!(
        Layout::load(&state, &session),
        state.api().search(&term, &filters)
    );

    let (products, facets) = match found {
        Ok(results) => {
            let facets = match results.available_filters {
                Some(available) => FilterFacets::from(available),
                None => FilterFacets::from_products(&results.products),
            };
            let mut products = results.products;
            sort.apply(&mut products);
            (Some(cards(&products)), facets)
        }
        Err(e) => {
            tracing::error!(error = %e, query = %term, "Search failed");
            (None, FilterFacets::default())
        }
    };

    SearchTemplate {
        layout: layout.with_query(&term),
        panel: FilterPanel::build("/search", Some(&term), &filters, &facets, sort),
        query: term,
        products,
    }
    .into_response()
}

// =============================================================================
// Suggestions (HTMX)
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
}

/// A linked suggestion row.
pub struct SuggestionLink {
    pub label: String,
    pub kind: Option<String>,
    pub href: String,
}

pub struct SuggestionGroup {
    pub title: &'static str,
    pub links: Vec<SuggestionLink>,
}

fn search_href(term: &str) -> String {
    format!("/search?q={}", urlencoding::encode(term))
}

fn term_links(items: &[Suggestion]) -> Vec<SuggestionLink> {
    items
        .iter()
        .filter_map(|s| {
            s.term().map(|term| SuggestionLink {
                label: term.to_owned(),
                kind: s.kind().map(str::to_owned),
                href: search_href(term),
            })
        })
        .collect()
}

/// Suggestion groups in display order. Empty groups are dropped.
#[must_use]
pub fn suggestion_groups(found: &Autocomplete) -> Vec<SuggestionGroup> {
    let mut groups = vec![
        SuggestionGroup {
            title: "Suggestions",
            links: term_links(&found.suggestions),
        },
        SuggestionGroup {
            title: "Categories",
            links: term_links(&found.categories),
        },
        SuggestionGroup {
            title: "Subcategories",
            links: term_links(&found.sub_categories),
        },
        SuggestionGroup {
            title: "Brands",
            links: term_links(&found.brands),
        },
    ];
    groups.retain(|g| !g.links.is_empty());
    groups
}

/// Suggestion dropdown fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/suggestions.html")]
pub struct SuggestionsTemplate {
    pub query: String,
    pub groups: Vec<SuggestionGroup>,
    pub products: Vec<ProductCard>,
    /// Shown instead of suggestions while the query is too short.
    pub recent_terms: Vec<String>,
}

/// Search-as-you-type suggestions (HTMX).
#[instrument(skip(state, session))]
pub async fn suggest(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SuggestQuery>,
) -> impl IntoResponse {
    let query = params.q.trim().to_owned();

    if query.chars().count() <= MIN_SUGGEST_CHARS {
        return SuggestionsTemplate {
            query,
            groups: Vec::new(),
            products: Vec::new(),
            recent_terms: RecentSearches::load(&session).await.terms().to_vec(),
        };
    }

    let found = match state.api().autocomplete(&query, AUTOCOMPLETE_LIMIT).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "Autocomplete failed");
            Autocomplete::default()
        }
    };

    SuggestionsTemplate {
        groups: suggestion_groups(&found),
        products: cards(&found.products),
        recent_terms: Vec::new(),
        query,
    }
}

/// Clear recent searches (HTMX). Empties the dropdown.
#[instrument(skip(session))]
pub async fn clear_recent(session: Session) -> Response {
    if let Err(e) = RecentSearches::clear(&session).await {
        tracing::warn!(error = %e, "Failed to clear recent searches");
    }
    Html("").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_suggestion_groups_order_and_links() {
        let found: Autocomplete = serde_json::from_value(json!({
            "suggestions": ["linen shirt", {"value": "linen pants", "type": "product"}],
            "categories": [{"name": "Shirts"}],
            "brands": [],
            "subCategories": [{"name": "  "}]
        }))
        .unwrap();

        let groups = suggestion_groups(&found);
        let titles: Vec<_> = groups.iter().map(|g| g.title).collect();
        assert_eq!(titles, vec!["Suggestions", "Categories"]);

        let first = groups.first().and_then(|g| g.links.first()).unwrap();
        assert_eq!(first.href, "/search?q=linen%20shirt");
        let second = groups.first().and_then(|g| g.links.get(1)).unwrap();
        assert_eq!(second.kind.as_deref(), Some("product"));
    }
}
