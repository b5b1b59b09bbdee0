//! Facet filters for product listings and search.

use std::fmt;

use macstorm_core::Price;
use rust_decimal::Decimal;
use serde::Deserialize;
use url::form_urlencoded;

use crate::api::types::{AvailableFilters, FacetOption, Product};

/// Minimum-discount choices offered in the filter panel.
pub const DISCOUNT_OPTIONS: [u32; 5] = [10, 20, 30, 40, 50];

/// Price range used when nothing better is known.
pub const DEFAULT_PRICE_CEILING: i64 = 10_000;

/// Which facet a toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Color,
    Size,
    Brand,
    Price,
    Discount,
}

impl FilterKind {
    /// Parse the `kind` used in filter toggle links.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "colors" | "color" => Some(Self::Color),
            "sizes" | "size" => Some(Self::Size),
            "brands" | "brand" => Some(Self::Brand),
            "price" => Some(Self::Price),
            "discount" => Some(Self::Discount),
            _ => None,
        }
    }
}

/// An inclusive price range in whole rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    pub min: i64,
    pub max: i64,
}

impl PriceBand {
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Parse the URL form `min-max`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (min, max) = s.trim().split_once('-')?;
        let min = min.trim().parse().ok()?;
        let max = max.trim().parse().ok()?;
        Some(Self { min, max })
    }

    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        let amount = price.amount();
        Decimal::from(self.min) <= amount && amount <= Decimal::from(self.max)
    }

    /// The fixed bands shown in the filter panel. The last band is open
    /// ended up to `ceiling`.
    #[must_use]
    pub fn options(ceiling: i64) -> Vec<(String, Self)> {
        vec![
            ("Under ₹500".to_string(), Self::new(0, 500)),
            ("₹500 - ₹1000".to_string(), Self::new(500, 1000)),
            ("₹1000 - ₹2000".to_string(), Self::new(1000, 2000)),
            ("₹2000 - ₹5000".to_string(), Self::new(2000, 5000)),
            ("Over ₹5000".to_string(), Self::new(5000, ceiling.max(5000))),
        ]
    }
}

impl fmt::Display for PriceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Filter parameters as they appear in the URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub colors: Option<String>,
    #[serde(default)]
    pub sizes: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub discount: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl FilterQuery {
    /// The trimmed search term, if any.
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in raw.unwrap_or_default().split(',') {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_owned());
        }
    }
    out
}

fn toggle_in(list: &mut Vec<String>, value: &str) {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
    } else {
        list.push(value.to_owned());
    }
}

/// The shopper's current facet selection.
///
/// Set facets keep insertion order so the URL stays stable as values
/// are toggled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub brands: Vec<String>,
    pub price: Option<PriceBand>,
    pub discount: Option<u32>,
}

impl ProductFilters {
    #[must_use]
    pub fn from_query(query: &FilterQuery) -> Self {
        Self {
            colors: split_list(query.colors.as_deref()),
            sizes: split_list(query.sizes.as_deref()),
            brands: split_list(query.brands.as_deref()),
            price: query.price.as_deref().and_then(PriceBand::parse),
            discount: query
                .discount
                .as_deref()
                .and_then(|d| d.trim().parse().ok())
                .filter(|d| *d > 0),
        }
    }

    /// Encode as a query string (without the leading `?`). `q` and `sort`
    /// are carried through when given.
    #[must_use]
    pub fn to_query(&self, q: Option<&str>, sort: Option<&str>) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        if let Some(q) = q.filter(|q| !q.is_empty()) {
            out.append_pair("q", q);
        }
        for (key, list) in [
            ("colors", &self.colors),
            ("sizes", &self.sizes),
            ("brands", &self.brands),
        ] {
            if !list.is_empty() {
                out.append_pair(key, &list.join(","));
            }
        }
        if let Some(price) = self.price {
            out.append_pair("price", &price.to_string());
        }
        if let Some(discount) = self.discount {
            out.append_pair("discount", &discount.to_string());
        }
        if let Some(sort) = sort.filter(|s| !s.is_empty()) {
            out.append_pair("sort", sort);
        }
        out.finish()
    }

    /// Toggle one facet value in place.
    ///
    /// Set facets add or remove `value`. Price and discount replace the
    /// current choice, and choosing the current one again clears it.
    pub fn toggle(&mut self, kind: FilterKind, value: &str) {
        match kind {
            FilterKind::Color => toggle_in(&mut self.colors, value),
            FilterKind::Size => toggle_in(&mut self.sizes, value),
            FilterKind::Brand => toggle_in(&mut self.brands, value),
            FilterKind::Price => {
                let band = PriceBand::parse(value);
                self.price = if band == self.price { None } else { band };
            }
            FilterKind::Discount => {
                let discount = value.trim().parse().ok();
                self.discount = if discount == self.discount {
                    None
                } else {
                    discount
                };
            }
        }
    }

    /// A copy with one value toggled, for building filter links.
    #[must_use]
    pub fn toggled(&self, kind: FilterKind, value: &str) -> Self {
        let mut next = self.clone();
        next.toggle(kind, value);
        next
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of active selections, as shown on the "Clear all" chip.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.colors.len()
            + self.sizes.len()
            + self.brands.len()
            + usize::from(self.price.is_some())
            + usize::from(self.discount.is_some())
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active_count() > 0
    }

    #[must_use]
    pub fn has(&self, kind: FilterKind, value: &str) -> bool {
        match kind {
            FilterKind::Color => self.colors.iter().any(|v| v == value),
            FilterKind::Size => self.sizes.iter().any(|v| v == value),
            FilterKind::Brand => self.brands.iter().any(|v| v == value),
            FilterKind::Price => self.price.map(|p| p.to_string()).as_deref() == Some(value),
            FilterKind::Discount => {
                self.discount.map(|d| d.to_string()).as_deref() == Some(value)
            }
        }
    }

    /// Whether `product` passes every active facet.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if !self.brands.is_empty() && !self.brands.contains(&product.brand) {
            return false;
        }
        if !self.sizes.is_empty()
            && !product
                .sizes
                .iter()
                .any(|s| s.in_stock && self.sizes.contains(&s.size))
        {
            return false;
        }
        if !self.colors.is_empty() && !self.colors.contains(&product.color) {
            return false;
        }
        if let Some(band) = self.price
            && !band.contains(product.price)
        {
            return false;
        }
        if let Some(discount) = self.discount
            && product.discount < discount
        {
            return false;
        }
        true
    }

    /// Query parameters for the backend `/search` endpoint.
    #[must_use]
    pub fn search_params(&self, q: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", q.to_owned())];
        for (key, list) in [
            ("colors", &self.colors),
            ("sizes", &self.sizes),
            ("brands", &self.brands),
        ] {
            if !list.is_empty() {
                params.push((key, list.join(",")));
            }
        }
        if let Some(price) = self.price {
            params.push(("minPrice", price.min.to_string()));
            params.push(("maxPrice", price.max.to_string()));
        }
        if let Some(discount) = self.discount {
            params.push(("discount", discount.to_string()));
        }
        params
    }
}

/// Facet values available for the current result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterFacets {
    pub colors: Vec<FacetOption>,
    pub sizes: Vec<FacetOption>,
    pub brands: Vec<FacetOption>,
    pub price_range: (Price, Price),
}

impl Default for FilterFacets {
    fn default() -> Self {
        Self {
            colors: Vec::new(),
            sizes: Vec::new(),
            brands: Vec::new(),
            price_range: (Price::ZERO, Price::from_rupees(DEFAULT_PRICE_CEILING)),
        }
    }
}

fn bump(options: &mut Vec<FacetOption>, value: &str) {
    if value.is_empty() {
        return;
    }
    match options.iter_mut().find(|o| o.value == value) {
        Some(option) => option.count += 1,
        None => options.push(FacetOption {
            value: value.to_owned(),
            label: None,
            count: 1,
        }),
    }
}

impl FilterFacets {
    /// Derive facets from products already fetched.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        let mut facets = Self::default();
        let mut min: Option<Price> = None;
        let mut max = Price::ZERO;

        for product in products {
            bump(&mut facets.colors, &product.color);
            bump(&mut facets.brands, &product.brand);
            for size in product.sizes.iter().filter(|s| s.is_available()) {
                bump(&mut facets.sizes, &size.size);
            }
            min = Some(min.map_or(product.price, |m| m.min(product.price)));
            max = max.max(product.price);
        }

        let low = min.map_or(0, Price::floor);
        let high = if max.is_zero() {
            DEFAULT_PRICE_CEILING
        } else {
            max.ceil()
        };
        facets.price_range = (Price::from_rupees(low), Price::from_rupees(high));
        facets
    }

    /// Upper bound of the price range in whole rupees.
    #[must_use]
    pub fn price_ceiling(&self) -> i64 {
        self.price_range.1.ceil()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.sizes.is_empty() && self.brands.is_empty()
    }
}

impl From<AvailableFilters> for FilterFacets {
    fn from(filters: AvailableFilters) -> Self {
        Self {
            colors: filters.colors,
            sizes: filters.sizes,
            brands: filters.brands,
            price_range: filters.price_range.unwrap_or((
                Price::ZERO,
                Price::from_rupees(DEFAULT_PRICE_CEILING),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(brand: &str, color: &str, price: u32, discount: u32) -> Product {
        serde_json::from_value(json!({
            "_id": format!("{brand}-{color}-{price}"),
            "brand": brand,
            "color": color,
            "price": price,
            "discount": discount,
            "sizes": [
                {"size": "M", "inStock": true, "count": 3},
                {"size": "L", "inStock": false, "count": 0}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_toggle_sets() {
        let mut filters = ProductFilters::default();
        filters.toggle(FilterKind::Color, "red");
        filters.toggle(FilterKind::Color, "blue");
        assert_eq!(filters.colors, vec!["red", "blue"]);
        filters.toggle(FilterKind::Color, "red");
        assert_eq!(filters.colors, vec!["blue"]);
    }

    #[test]
    fn test_toggle_price_replaces_and_clears() {
        let mut filters = ProductFilters::default();
        filters.toggle(FilterKind::Price, "0-500");
        filters.toggle(FilterKind::Price, "500-1000");
        assert_eq!(filters.price, Some(PriceBand::new(500, 1000)));
        filters.toggle(FilterKind::Price, "500-1000");
        assert_eq!(filters.price, None);

        filters.toggle(FilterKind::Discount, "20");
        assert_eq!(filters.discount, Some(20));
        filters.toggle(FilterKind::Discount, "20");
        assert_eq!(filters.discount, None);
    }

    #[test]
    fn test_active_count() {
        let mut filters = ProductFilters::default();
        assert!(!filters.is_active());
        filters.toggle(FilterKind::Brand, "a");
        filters.toggle(FilterKind::Brand, "b");
        filters.toggle(FilterKind::Size, "M");
        filters.toggle(FilterKind::Price, "0-500");
        filters.toggle(FilterKind::Discount, "10");
        assert_eq!(filters.active_count(), 5);
        filters.clear();
        assert_eq!(filters.active_count(), 0);
    }

    #[test]
    fn test_query_round_trip_keeps_q() {
        let query = FilterQuery {
            q: Some("linen shirt".into()),
            colors: Some("white,,blue".into()),
            sizes: Some("M".into()),
            brands: None,
            price: Some("500-1000".into()),
            discount: Some("30".into()),
            sort: None,
        };
        let filters = ProductFilters::from_query(&query);
        assert_eq!(filters.colors, vec!["white", "blue"]);
        assert_eq!(filters.price, Some(PriceBand::new(500, 1000)));

        let encoded = filters.to_query(query.term(), None);
        assert_eq!(
            encoded,
            "q=linen+shirt&colors=white%2Cblue&sizes=M&price=500-1000&discount=30"
        );
    }

    #[test]
    fn test_from_query_ignores_garbage() {
        let query = FilterQuery {
            price: Some("cheap".into()),
            discount: Some("lots".into()),
            ..FilterQuery::default()
        };
        let filters = ProductFilters::from_query(&query);
        assert_eq!(filters, ProductFilters::default());
    }

    #[test]
    fn test_matches() {
        let shirt = product("MacStorm", "white", 800, 30);
        let mut filters = ProductFilters::default();
        assert!(filters.matches(&shirt));

        filters.toggle(FilterKind::Brand, "MacStorm");
        filters.toggle(FilterKind::Color, "white");
        filters.toggle(FilterKind::Size, "M");
        filters.toggle(FilterKind::Price, "500-1000");
        filters.toggle(FilterKind::Discount, "30");
        assert!(filters.matches(&shirt));

        // L is out of stock
        assert!(!filters.toggled(FilterKind::Size, "M").toggled(FilterKind::Size, "L").matches(&shirt));
        assert!(!filters.toggled(FilterKind::Discount, "40").matches(&shirt));
        assert!(!filters.toggled(FilterKind::Price, "0-500").matches(&shirt));
        assert!(!filters.toggled(FilterKind::Brand, "MacStorm").toggled(FilterKind::Brand, "Other").matches(&shirt));
    }

    #[test]
    fn test_price_band_is_inclusive() {
        let band = PriceBand::new(500, 1000);
        assert!(band.contains(Price::from_rupees(500)));
        assert!(band.contains(Price::from_rupees(1000)));
        assert!(!band.contains(Price::from_rupees(1001)));
    }

    #[test]
    fn test_search_params() {
        let mut filters = ProductFilters::default();
        filters.toggle(FilterKind::Size, "S");
        filters.toggle(FilterKind::Size, "M");
        filters.toggle(FilterKind::Price, "2000-5000");
        let params = filters.search_params("jeans");
        assert_eq!(
            params,
            vec![
                ("q", "jeans".to_string()),
                ("sizes", "S,M".to_string()),
                ("minPrice", "2000".to_string()),
                ("maxPrice", "5000".to_string()),
            ]
        );
    }

    #[test]
    fn test_facets_from_products() {
        let products = vec![
            product("MacStorm", "white", 799, 0),
            product("MacStorm", "black", 1499, 10),
            product("Other", "white", 2000, 0),
        ];
        let facets = FilterFacets::from_products(&products);
        let white = facets.colors.iter().find(|c| c.value == "white").unwrap();
        assert_eq!(white.count, 2);
        assert_eq!(facets.brands.len(), 2);
        // Only the in-stock size is offered
        assert_eq!(facets.sizes.len(), 1);
        assert_eq!(facets.sizes.first().unwrap().count, 3);
        assert_eq!(
            facets.price_range,
            (Price::from_rupees(799), Price::from_rupees(2000))
        );
    }

    #[test]
    fn test_facets_default_range() {
        let facets = FilterFacets::from_products(&[]);
        assert_eq!(
            facets.price_range,
            (Price::ZERO, Price::from_rupees(DEFAULT_PRICE_CEILING))
        );
    }

    #[test]
    fn test_price_band_options_use_ceiling() {
        let options = PriceBand::options(12_000);
        assert_eq!(options.len(), 5);
        assert_eq!(options.last().unwrap().1, PriceBand::new(5000, 12_000));
    }
}
