//! Product detail page: gallery, size picker, reviews and delivery check.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
};
use macstorm_core::{Pincode, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::Layout;
use crate::api::ErrorKind;
use crate::api::types::{Product, Review, SizeStock};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::reviews::{ReviewSummary, stars};
use crate::state::AppState;

/// Quantity cap when a size carries no stock count.
pub const DEFAULT_MAX_QUANTITY: u32 = 10;

/// Reviews shown before "Show all".
const REVIEW_PREVIEW: usize = 3;

/// Review photos shown inline before the "+N" tile.
const REVIEW_IMAGE_PREVIEW: usize = 3;

pub const SELECT_SIZE: &str = "Please select a size";
pub const INVALID_PINCODE: &str = "Please enter a valid 6-digit pincode";

/// Largest quantity orderable for `size`.
#[must_use]
pub fn max_quantity(size: Option<&SizeStock>) -> u32 {
    size.map(|s| s.count)
        .filter(|count| *count > 0)
        .unwrap_or(DEFAULT_MAX_QUANTITY)
}

/// The size `code` when it can go in the bag. A size without a stock count
/// still counts when it is flagged in stock.
#[must_use]
pub fn orderable_size<'a>(product: &'a Product, code: &str) -> Option<&'a SizeStock> {
    product.size(code).filter(|s| s.in_stock)
}

/// Clamp a requested quantity to `1..=max`.
///
/// # Errors
///
/// Returns the toast text when `requested` exceeds `max`.
pub fn check_quantity(requested: u32, max: u32) -> Result<u32, String> {
    if requested > max {
        Err(format!("Maximum {max} items available for this size"))
    } else {
        Ok(requested.max(1))
    }
}

/// Delivery check. Any well-formed pincode is serviceable.
///
/// # Errors
///
/// Returns [`INVALID_PINCODE`] for anything but six digits.
pub fn delivery_check(raw: &str) -> Result<String, &'static str> {
    Pincode::parse(raw)
        .map(|pin| format!("Delivery available to {pin}"))
        .map_err(|_| INVALID_PINCODE)
}

// =============================================================================
// Views
// =============================================================================

pub struct SizeOption {
    pub code: String,
    pub label: String,
    pub available: bool,
    pub selected: bool,
}

pub struct ProductView {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub color: String,
    pub category: String,
    pub sub_category: String,
    pub price: String,
    pub list_price: Option<String>,
    pub discount: u32,
    pub description: String,
    pub features: Vec<String>,
    pub details: Vec<(String, String)>,
    pub images: Vec<(String, String)>,
    pub sizes: Vec<SizeOption>,
    pub selected_size: Option<String>,
    pub max_quantity: u32,
}

impl ProductView {
    fn new(product: &Product, requested_size: Option<&str>) -> Self {
        let selected = requested_size
            .and_then(|code| orderable_size(product, code))
            .or_else(|| product.default_size());

        Self {
            id: product.id.to_string(),
            name: product.product_name.clone(),
            brand: product.brand.clone(),
            color: product.color.clone(),
            category: product.category.clone(),
            sub_category: product.sub_category.clone(),
            price: product.price.to_string(),
            list_price: product
                .has_markdown()
                .then(|| product.list_price().to_string()),
            discount: product.discount,
            description: product.product_description.clone(),
            features: product.features.clone(),
            details: product.detail_rows(),
            images: product
                .images
                .iter()
                .enumerate()
                .map(|(i, img)| {
                    let alt = if img.alt.is_empty() {
                        format!("{} {}", product.product_name, i + 1)
                    } else {
                        img.alt.clone()
                    };
                    (img.url.clone(), alt)
                })
                .collect(),
            sizes: product
                .sizes
                .iter()
                .map(|s| SizeOption {
                    code: s.size.clone(),
                    label: s.label().to_owned(),
                    available: s.in_stock,
                    selected: selected.is_some_and(|sel| sel.size == s.size),
                })
                .collect(),
            selected_size: selected.map(|s| s.size.clone()),
            max_quantity: max_quantity(selected),
        }
    }
}

/// `★★★★☆` style rating line. Half stars render as `⯪`.
fn star_line(full: usize, half: bool, empty: usize) -> String {
    let mut line = "★".repeat(full);
    if half {
        line.push('⯪');
    }
    line.push_str(&"☆".repeat(empty));
    line
}

pub struct ReviewView {
    pub author: String,
    pub initial: String,
    pub rating: u32,
    pub star_line: String,
    pub comment: String,
    pub images: Vec<String>,
    pub more_images: usize,
    pub verified: bool,
    pub date: Option<String>,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        let author = review.author().to_owned();
        Self {
            initial: author
                .chars()
                .next()
                .map_or_else(|| "U".to_string(), |c| c.to_uppercase().collect()),
            author,
            rating: review.rating.min(5),
            star_line: {
                let (full, half, empty) = stars(f64::from(review.rating));
                star_line(full, half, empty)
            },
            comment: review.comment.clone(),
            images: review
                .images
                .iter()
                .take(REVIEW_IMAGE_PREVIEW)
                .cloned()
                .collect(),
            more_images: review.images.len().saturating_sub(REVIEW_IMAGE_PREVIEW),
            verified: review.is_verified_purchase,
            date: review.created_at.map(|d| d.format("%-d %b %Y").to_string()),
        }
    }
}

/// One bar of the rating histogram.
pub struct RatingBar {
    pub stars: u32,
    pub count: usize,
    pub percent: usize,
}

pub struct SummaryView {
    pub average: String,
    pub total: usize,
    pub star_line: String,
    pub bars: Vec<RatingBar>,
}

impl From<&ReviewSummary> for SummaryView {
    fn from(summary: &ReviewSummary) -> Self {
        let (full, half, empty) = stars(summary.average);
        Self {
            average: summary.average_label(),
            total: summary.total,
            star_line: star_line(full, half, empty),
            bars: summary
                .distribution
                .iter()
                .map(|&(stars, count)| RatingBar {
                    stars,
                    count,
                    percent: summary.percent(count),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/product.html")]
pub struct ProductTemplate {
    pub layout: Layout,
    pub product: Option<ProductView>,
    pub error: String,
    pub summary: SummaryView,
    pub preview: Vec<ReviewView>,
    pub more_reviews: Vec<ReviewView>,
    pub wishlisted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub size: Option<String>,
}

/// Display a product.
///
/// Product, reviews and wishlist state are fetched concurrently.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
    Path(id): Path<String>,
    Query(query): Query<ProductQuery>,
) -> impl IntoResponse {
    let id = ProductId::new(id);
    let token = auth.token();
    let api = state.api();

    let wishlist_check = async {
        match token {
            Some(token) => api.wishlist_contains(&id, Some(token)).await,
            None => Ok(false),
        }
    };

    let (layout, product, reviews, wishlisted) = tokio::join!(
        Layout::load(&state, &session),
        api.product(&id),
        api.reviews(&id),
        wishlist_check
    );

    let reviews = reviews.unwrap_or_else(|e| {
        tracing::warn!(error = %e, product_id = %id, "Failed to load reviews");
        Vec::new()
    });
    let wishlisted = wishlisted.unwrap_or_else(|e| {
        tracing::warn!(error = %e, product_id = %id, "Failed to check wishlist");
        false
    });

    let (product, error) = match product {
        Ok(product) => (Some(ProductView::new(&product, query.size.as_deref())), String::new()),
        Err(e) if e.kind() == ErrorKind::NotFound => (None, "Product not found".to_string()),
        Err(e) => {
            tracing::error!(error = %e, product_id = %id, "Failed to load product");
            (None, e.user_message("Failed to load product details"))
        }
    };

    let summary = SummaryView::from(&ReviewSummary::from_reviews(&reviews));
    let mut views: Vec<ReviewView> = reviews.iter().map(ReviewView::from).collect();
    let more_reviews = views.split_off(views.len().min(REVIEW_PREVIEW));

    ProductTemplate {
        layout,
        product,
        error,
        summary,
        preview: views,
        more_reviews,
        wishlisted,
    }
}

#[derive(Debug, Deserialize)]
pub struct DeliveryQuery {
    #[serde(default)]
    pub pincode: String,
}

/// Pincode delivery check (HTMX fragment).
#[instrument]
pub async fn delivery(Query(query): Query<DeliveryQuery>) -> Html<String> {
    match delivery_check(&query.pincode) {
        Ok(message) => Html(format!("<p class=\"delivery delivery-ok\">{message}</p>")),
        Err(message) => Html(format!("<p class=\"delivery delivery-error\">{message}</p>")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product() -> Product {
        serde_json::from_value(json!({
            "_id": "p1",
            "productName": "Oxford Shirt",
            "price": 1499,
            "sizes": [
                {"size": "S", "inStock": false, "count": 0},
                {"size": "M", "sizeLabel": "Medium", "inStock": true, "count": 4},
                {"size": "L", "inStock": true, "count": 0}
            ],
            "images": [{"url": "/1.jpg"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_default_size_is_first_in_stock() {
        let view = ProductView::new(&product(), None);
        assert_eq!(view.selected_size.as_deref(), Some("M"));
        assert_eq!(view.max_quantity, 4);
        assert_eq!(view.images.first().map(|i| i.1.as_str()), Some("Oxford Shirt 1"));
    }

    #[test]
    fn test_requested_size_must_be_in_stock() {
        let view = ProductView::new(&product(), Some("S"));
        assert_eq!(view.selected_size.as_deref(), Some("M"));
        let view = ProductView::new(&product(), Some("L"));
        assert_eq!(view.selected_size.as_deref(), Some("L"));
        assert_eq!(view.max_quantity, DEFAULT_MAX_QUANTITY);
    }

    #[test]
    fn test_uncounted_in_stock_size_is_orderable() {
        let uncounted: Product = serde_json::from_value(json!({
            "_id": "p1",
            "price": 499,
            "sizes": [{"size": "M", "inStock": true}]
        }))
        .unwrap();

        let view = ProductView::new(&uncounted, None);
        assert_eq!(view.selected_size.as_deref(), Some("M"));

        let size = orderable_size(&uncounted, "M").unwrap();
        assert_eq!(max_quantity(Some(size)), DEFAULT_MAX_QUANTITY);
        assert_eq!(check_quantity(2, max_quantity(Some(size))), Ok(2));
        assert!(orderable_size(&uncounted, "XL").is_none());
        assert!(orderable_size(&product(), "S").is_none());
    }

    #[test]
    fn test_star_line() {
        assert_eq!(star_line(3, true, 1), "★★★⯪☆");
        assert_eq!(star_line(0, false, 5), "☆☆☆☆☆");
    }

    #[test]
    fn test_check_quantity() {
        assert_eq!(check_quantity(3, 4), Ok(3));
        assert_eq!(check_quantity(0, 4), Ok(1));
        assert_eq!(
            check_quantity(5, 4),
            Err("Maximum 4 items available for this size".to_string())
        );
    }

    #[test]
    fn test_delivery_check() {
        assert_eq!(delivery_check("411001").unwrap(), "Delivery available to 411001");
        assert_eq!(delivery_check("4110"), Err(INVALID_PINCODE));
        assert_eq!(delivery_check("41100a"), Err(INVALID_PINCODE));
    }
}
