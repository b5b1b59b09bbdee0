//! Category listing pages and the filter panel they share with search.
//!
//! Listings fetch the catalog once and scope it locally to the path.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use super::cards::{ProductCard, cards};
use super::layout::Layout;
use crate::catalog::{
    DISCOUNT_OPTIONS, FilterFacets, FilterKind, FilterQuery, ListingScope, PriceBand,
    ProductFilters, SortOrder, build_listing, title_case,
};
use crate::filters;
use crate::state::AppState;

// =============================================================================
// Filter panel
// =============================================================================

/// A toggle link for one facet value.
pub struct FacetLink {
    pub label: String,
    pub count: Option<u32>,
    pub href: String,
    pub active: bool,
}

pub struct FacetGroup {
    pub title: &'static str,
    pub links: Vec<FacetLink>,
}

pub struct SortLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// The filter sidebar: facet toggles, sort choices and "Clear all".
pub struct FilterPanel {
    pub groups: Vec<FacetGroup>,
    pub sorts: Vec<SortLink>,
    pub active_count: usize,
    pub clear_href: String,
}

fn link(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_owned()
    } else {
        format!("{path}?{query}")
    }
}

const fn sort_param(sort: SortOrder) -> Option<&'static str> {
    match sort {
        SortOrder::Featured => None,
        other => Some(other.slug()),
    }
}

impl FilterPanel {
    /// Build every link against `path`, carrying `q` and the sort order.
    #[must_use]
    pub fn build(
        path: &str,
        q: Option<&str>,
        filters: &ProductFilters,
        facets: &FilterFacets,
        sort: SortOrder,
    ) -> Self {
        let sort_slug = sort_param(sort);
        let toggle = |kind: FilterKind, value: &str, label: String, count: Option<u32>| FacetLink {
            label,
            count,
            href: link(path, &filters.toggled(kind, value).to_query(q, sort_slug)),
            active: filters.has(kind, value),
        };

        let facet_group = |title, kind, options: &[crate::api::types::FacetOption]| FacetGroup {
            title,
            links: options
                .iter()
                .map(|o| toggle(kind, &o.value, title_case(o.label()), Some(o.count)))
                .collect(),
        };

        let mut groups = vec![
            facet_group("Color", FilterKind::Color, &facets.colors),
            facet_group("Size", FilterKind::Size, &facets.sizes),
            facet_group("Brand", FilterKind::Brand, &facets.brands),
            FacetGroup {
                title: "Price",
                links: PriceBand::options(facets.price_ceiling())
                    .into_iter()
                    .map(|(label, band)| toggle(FilterKind::Price, &band.to_string(), label, None))
                    .collect(),
            },
            FacetGroup {
                title: "Discount",
                links: DISCOUNT_OPTIONS
                    .iter()
                    .map(|d| {
                        toggle(
                            FilterKind::Discount,
                            &d.to_string(),
                            format!("{d}% and above"),
                            None,
                        )
                    })
                    .collect(),
            },
        ];
        groups.retain(|g| !g.links.is_empty());

        let sorts = SortOrder::ALL
            .iter()
            .map(|&order| SortLink {
                label: order.label(),
                href: link(path, &filters.to_query(q, sort_param(order))),
                active: order == sort,
            })
            .collect();

        Self {
            groups,
            sorts,
            active_count: filters.active_count(),
            clear_href: link(path, &ProductFilters::default().to_query(q, sort_slug)),
        }
    }
}

// =============================================================================
// Listing pages
// =============================================================================

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/listing.html")]
pub struct ListingTemplate {
    pub layout: Layout,
    pub title: String,
    /// `None` when the catalog failed to load.
    pub products: Option<Vec<ProductCard>>,
    pub panel: FilterPanel,
}

async fn render(
    state: &AppState,
    session: &Session,
    scope: ListingScope,
    query: &FilterQuery,
) -> ListingTemplate {
    let filters = ProductFilters::from_query(query);
    let sort = SortOrder::parse(query.sort.as_deref().unwrap_or_default());

    let (layout, catalog) = tokio::join!(Layout::load(state, session), state.api().products());

    let (products, facets) = match catalog {
        Ok(catalog) => {
            let (visible, facets) = build_listing(catalog, &scope, &filters, sort);
            (Some(cards(&visible)), facets)
        }
        Err(e) => {
            tracing::error!(error = %e, path = %scope.path(), "Failed to load products");
            (None, FilterFacets::default())
        }
    };

    ListingTemplate {
        layout,
        title: scope.title(),
        products,
        panel: FilterPanel::build(&scope.path(), None, &filters, &facets, sort),
    }
}

/// `/products/{section}/{category}`, linked from the home page tiles.
#[instrument(skip(state, session, query))]
pub async fn section(
    State(state): State<AppState>,
    session: Session,
    Path((section, category)): Path<(String, String)>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    render(
        &state,
        &session,
        ListingScope::Section { section, category },
        &query,
    )
    .await
}

/// `/{gender}/{category}/{subcategory}`, linked from the navigation menu.
#[instrument(skip(state, session, query))]
pub async fn navigation(
    State(state): State<AppState>,
    session: Session,
    Path((gender, category, subcategory)): Path<(String, String, String)>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    render(
        &state,
        &session,
        ListingScope::Navigation {
            gender,
            category,
            subcategory,
        },
        &query,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::FacetOption;

    fn facets() -> FilterFacets {
        FilterFacets {
            colors: vec![FacetOption {
                value: "blue".into(),
                label: None,
                count: 2,
            }],
            ..FilterFacets::default()
        }
    }

    #[test]
    fn test_panel_links_toggle_values() {
        let filters = ProductFilters::default();
        let panel = FilterPanel::build("/men/shirts/casual", None, &filters, &facets(), SortOrder::Featured);

        let color = panel.groups.iter().find(|g| g.title == "Color").map(|g| &g.links);
        let blue = color.and_then(|links| links.first());
        assert_eq!(blue.map(|l| l.href.as_str()), Some("/men/shirts/casual?colors=blue"));
        assert_eq!(blue.map(|l| l.active), Some(false));
        assert!(panel.groups.iter().all(|g| g.title != "Size"));
        assert_eq!(panel.clear_href, "/men/shirts/casual");
    }

    #[test]
    fn test_panel_keeps_query_and_sort() {
        let mut filters = ProductFilters::default();
        filters.toggle(FilterKind::Color, "blue");
        let panel = FilterPanel::build("/search", Some("shirt"), &filters, &facets(), SortOrder::Rating);

        let blue = panel
            .groups
            .iter()
            .find(|g| g.title == "Color")
            .and_then(|g| g.links.first());
        assert_eq!(blue.map(|l| l.active), Some(true));
        assert_eq!(blue.map(|l| l.href.as_str()), Some("/search?q=shirt&sort=rating"));
        assert_eq!(panel.active_count, 1);
        assert_eq!(panel.clear_href, "/search?q=shirt&sort=rating");

        let active_sort = panel.sorts.iter().find(|s| s.active).map(|s| s.label);
        assert_eq!(active_sort, Some("Highest Rated"));
    }
}
