//! Product listing logic: facet filters, sorting and path-based scoping.
//!
//! Listings fetch the catalog once and narrow it locally, so everything
//! here is pure and synchronous.

mod filters;
mod sort;

pub use filters::{
    DEFAULT_PRICE_CEILING, DISCOUNT_OPTIONS, FilterFacets, FilterKind, FilterQuery, PriceBand,
    ProductFilters,
};
pub use sort::SortOrder;

use crate::api::types::Product;

/// Which slice of the catalog a listing page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingScope {
    /// `/{gender}/{category}/{subcategory}` from the navigation menu.
    Navigation {
        gender: String,
        category: String,
        subcategory: String,
    },
    /// `/products/{section}/{category}` from a home page tile.
    Section { section: String, category: String },
}

impl ListingScope {
    #[must_use]
    pub fn includes(&self, product: &Product) -> bool {
        match self {
            Self::Navigation {
                gender,
                category,
                subcategory,
            } => {
                product.category == *gender
                    && product.sub_category == *category
                    && product.product_type == *subcategory
            }
            Self::Section { section, category } => {
                product.category == *section && product.sub_category == *category
            }
        }
    }

    /// Path of the listing page itself.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Navigation {
                gender,
                category,
                subcategory,
            } => format!("/{gender}/{category}/{subcategory}"),
            Self::Section { section, category } => format!("/products/{section}/{category}"),
        }
    }

    /// Heading for the listing, e.g. `Men / Shirts`.
    #[must_use]
    pub fn title(&self) -> String {
        let parts: Vec<&str> = match self {
            Self::Navigation {
                gender,
                category,
                subcategory,
            } => vec![gender.as_str(), category.as_str(), subcategory.as_str()],
            Self::Section { section, category } => vec![section.as_str(), category.as_str()],
        };
        parts
            .into_iter()
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// `sweat-shirts` to `Sweat Shirts`.
#[must_use]
pub fn title_case(slug: &str) -> String {
    slug.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scope, filter and sort a fetched catalog.
///
/// Returns the visible products and the facets of the scoped set, so
/// the filter panel offers every value in scope, not just the survivors.
#[must_use]
pub fn build_listing(
    products: Vec<Product>,
    scope: &ListingScope,
    filters: &ProductFilters,
    sort: SortOrder,
) -> (Vec<Product>, FilterFacets) {
    let scoped: Vec<Product> = products.into_iter().filter(|p| scope.includes(p)).collect();
    let facets = FilterFacets::from_products(&scoped);
    let mut visible: Vec<Product> = scoped.into_iter().filter(|p| filters.matches(p)).collect();
    sort.apply(&mut visible);
    (visible, facets)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Vec<Product> {
        serde_json::from_value(json!([
            {"_id": "1", "category": "men", "subCategory": "shirts", "productType": "casual", "price": 999, "color": "blue"},
            {"_id": "2", "category": "men", "subCategory": "shirts", "productType": "formal", "price": 1999, "color": "white"},
            {"_id": "3", "category": "women", "subCategory": "shirts", "productType": "casual", "price": 799, "color": "red"},
            {"_id": "4", "category": "men", "subCategory": "shirts", "productType": "casual", "price": 499, "color": "white"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_navigation_scope() {
        let scope = ListingScope::Navigation {
            gender: "men".into(),
            category: "shirts".into(),
            subcategory: "casual".into(),
        };
        let (products, facets) = build_listing(
            catalog(),
            &scope,
            &ProductFilters::default(),
            SortOrder::PriceLowHigh,
        );
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "1"]);
        assert_eq!(facets.colors.len(), 2);
        assert_eq!(scope.path(), "/men/shirts/casual");
    }

    #[test]
    fn test_section_scope_with_filter() {
        let scope = ListingScope::Section {
            section: "men".into(),
            category: "shirts".into(),
        };
        let mut filters = ProductFilters::default();
        filters.toggle(FilterKind::Color, "white");
        let (products, facets) = build_listing(catalog(), &scope, &filters, SortOrder::PriceHighLow);
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4"]);
        // Facets come from the scope, not the filtered result
        assert_eq!(facets.colors.len(), 2);
    }

    #[test]
    fn test_title() {
        let scope = ListingScope::Section {
            section: "women".into(),
            category: "t-shirts".into(),
        };
        assert_eq!(scope.title(), "Women / T Shirts");
    }
}
