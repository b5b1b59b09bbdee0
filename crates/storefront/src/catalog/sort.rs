//! Listing sort orders.

use std::cmp::Ordering;

use crate::api::types::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Featured products first, then by rating.
    #[default]
    Featured,
    PriceLowHigh,
    PriceHighLow,
    Rating,
    Discount,
    Newest,
}

impl SortOrder {
    pub const ALL: [Self; 6] = [
        Self::Featured,
        Self::Newest,
        Self::PriceLowHigh,
        Self::PriceHighLow,
        Self::Rating,
        Self::Discount,
    ];

    /// Parse a URL slug. Unknown input gives [`SortOrder::Featured`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "price-low-high" => Self::PriceLowHigh,
            "price-high-low" => Self::PriceHighLow,
            "rating" => Self::Rating,
            "discount" => Self::Discount,
            "newest" => Self::Newest,
            _ => Self::Featured,
        }
    }

    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLowHigh => "price-low-high",
            Self::PriceHighLow => "price-high-low",
            Self::Rating => "rating",
            Self::Discount => "discount",
            Self::Newest => "newest",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Featured => "Relevance",
            Self::PriceLowHigh => "Price: Low to High",
            Self::PriceHighLow => "Price: High to Low",
            Self::Rating => "Highest Rated",
            Self::Discount => "Better Discount",
            Self::Newest => "New In",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Featured => b
                .is_featured
                .cmp(&a.is_featured)
                .then_with(|| b.rating.total_cmp(&a.rating)),
            Self::PriceLowHigh => a.price.cmp(&b.price),
            Self::PriceHighLow => b.price.cmp(&a.price),
            Self::Rating => b.rating.total_cmp(&a.rating),
            Self::Discount => b.discount.cmp(&a.discount),
            // Products without a date sort last
            Self::Newest => b.created_at.cmp(&a.created_at),
        }
    }

    /// Sort in place. Stable, so ties keep the backend's order.
    pub fn apply(self, products: &mut [Product]) {
        products.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn products() -> Vec<Product> {
        serde_json::from_value(json!([
            {"_id": "a", "price": 900, "rating": 3.0, "discount": 10, "createdAt": "2025-01-01T00:00:00Z"},
            {"_id": "b", "price": 400, "rating": 4.8, "discount": 40, "isFeatured": false},
            {"_id": "c", "price": 1500, "rating": 4.1, "discount": 0, "isFeatured": true, "createdAt": "2025-06-01T00:00:00Z"}
        ]))
        .unwrap()
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_parse_unknown_is_featured() {
        assert_eq!(SortOrder::parse("bogus"), SortOrder::Featured);
        assert_eq!(SortOrder::parse("newest"), SortOrder::Newest);
        for order in SortOrder::ALL {
            assert_eq!(SortOrder::parse(order.slug()), order);
        }
    }

    #[test]
    fn test_featured_then_rating() {
        let mut list = products();
        SortOrder::Featured.apply(&mut list);
        assert_eq!(ids(&list), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_price_orders() {
        let mut list = products();
        SortOrder::PriceLowHigh.apply(&mut list);
        assert_eq!(ids(&list), vec!["b", "a", "c"]);
        SortOrder::PriceHighLow.apply(&mut list);
        assert_eq!(ids(&list), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_rating_discount_newest() {
        let mut list = products();
        SortOrder::Rating.apply(&mut list);
        assert_eq!(ids(&list), vec!["b", "c", "a"]);
        SortOrder::Discount.apply(&mut list);
        assert_eq!(ids(&list), vec!["b", "a", "c"]);
        SortOrder::Newest.apply(&mut list);
        assert_eq!(ids(&list), vec!["c", "a", "b"]);
    }
}
