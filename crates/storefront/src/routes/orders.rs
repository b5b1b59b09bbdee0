//! Order history, order detail, cancellation requests and reviews.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use macstorm_core::{ItemStatus, OrderId, OrderItemId, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use super::layout::Layout;
use crate::api::types::{Order, OrderItem, ReviewImage};
use crate::api::{ErrorKind, MAX_REVIEW_IMAGES, NewReview};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Flash;
use crate::orders::{
    CANCELLATION_FAILED, CANCELLATION_REASONS, CANCELLATION_SUBMITTED, CancelForm, OTHER_REASON,
    TIMELINE, estimated_delivery, long_date, status_tone,
};
use crate::reviews::{REVIEW_FAILED, REVIEW_SUBMITTED, validate_review};
use crate::state::AppState;

pub const ORDER_LOAD_FAILED: &str = "Failed to load order details";

/// Thumbnails shown per order in the history list.
const LIST_THUMBNAILS: usize = 3;

fn order_path(id: &OrderId) -> String {
    format!("/orders/{}", urlencoding::encode(id.as_str()))
}

fn short_date(order: &Order) -> Option<String> {
    order.created_at.map(|d| d.format("%-d %b %Y").to_string())
}

// =============================================================================
// History
// =============================================================================

pub struct OrderSummaryView {
    pub href: String,
    pub code: String,
    pub date: Option<String>,
    pub status: &'static str,
    pub tone: &'static str,
    pub total: String,
    pub item_count: u32,
    pub thumbnails: Vec<String>,
    pub more_items: usize,
    pub payment: &'static str,
}

impl From<&Order> for OrderSummaryView {
    fn from(order: &Order) -> Self {
        let status = order.overall_status();
        let images: Vec<String> = order
            .items
            .iter()
            .filter_map(|i| i.product.as_ref()?.primary_image().map(|img| img.url.clone()))
            .collect();
        Self {
            href: order_path(&order.id),
            code: order.id.short_code(),
            date: short_date(order),
            status: status.label(),
            tone: status_tone(status),
            total: order.payable().to_string(),
            item_count: order.total_quantity(),
            more_items: images.len().saturating_sub(LIST_THUMBNAILS),
            thumbnails: images.into_iter().take(LIST_THUMBNAILS).collect(),
            payment: order.payment_method.label(),
        }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/orders.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    /// `None` when the history failed to load.
    pub orders: Option<Vec<OrderSummaryView>>,
}

/// Display the shopper's orders.
#[instrument(skip(state, session, shopper))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
) -> impl IntoResponse {
    let (layout, orders) = tokio::join!(
        Layout::load(&state, &session),
        state.api().orders(Some(&shopper.token))
    );

    let orders = match orders {
        Ok(orders) => Some(orders.iter().map(OrderSummaryView::from).collect()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load orders");
            None
        }
    };

    OrdersTemplate { layout, orders }
}

// =============================================================================
// Detail
// =============================================================================

pub struct TimelineStep {
    pub label: &'static str,
    pub reached: bool,
}

/// Timeline for `status`. Cancelled and unknown orders reach no step.
#[must_use]
pub fn timeline(status: ItemStatus) -> Vec<TimelineStep> {
    TIMELINE
        .iter()
        .map(|&step| TimelineStep {
            label: step.label(),
            reached: status.has_reached(step),
        })
        .collect()
}

pub struct OrderItemView {
    /// Path segment for the item's cancel action.
    pub id: String,
    pub product_id: Option<String>,
    pub href: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub size: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
    pub status: &'static str,
    pub tone: &'static str,
    pub cancellation: Option<&'static str>,
    pub cancellation_reason: Option<String>,
    pub admin_notes: Option<String>,
    pub can_cancel: bool,
    pub can_review: bool,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        let product = item.product.as_ref();
        Self {
            id: urlencoding::encode(item.id.as_str()).into_owned(),
            product_id: product.map(|p| p.id.to_string()),
            href: product.map(|p| format!("/product/{}", urlencoding::encode(p.id.as_str()))),
            name: product.map_or_else(
                || "Product no longer available".to_string(),
                |p| p.product_name.clone(),
            ),
            image: product.and_then(|p| p.primary_image().map(|i| i.url.clone())),
            size: item.size.clone(),
            quantity: item.quantity,
            price: item.price.to_string(),
            line_total: item.line_total().to_string(),
            status: item.status.label(),
            tone: status_tone(item.status),
            cancellation: item.cancellation_status.map(|c| c.label()),
            cancellation_reason: item
                .cancellation_reason
                .clone()
                .filter(|r| !r.trim().is_empty()),
            admin_notes: item.admin_notes.clone().filter(|n| !n.trim().is_empty()),
            can_cancel: item.can_cancel(),
            can_review: item.can_review(),
        }
    }
}

pub struct ShippingView {
    pub full_name: String,
    pub lines: Vec<String>,
    pub mobile: String,
}

pub struct OrderDetailView {
    pub path: String,
    pub code: String,
    pub placed_on: Option<String>,
    pub status: &'static str,
    pub tone: &'static str,
    pub timeline: Vec<TimelineStep>,
    /// Only while the order is still on its way.
    pub estimated_delivery: Option<String>,
    pub shipping: Option<ShippingView>,
    pub payment_method: &'static str,
    pub payment_status: &'static str,
    pub total: String,
    pub coupon_code: Option<String>,
    pub coupon_discount: Option<String>,
    pub payable: String,
    pub items: Vec<OrderItemView>,
}

impl OrderDetailView {
    #[must_use]
    pub fn new(order: &Order, today: NaiveDate) -> Self {
        let status = order.overall_status();
        let placed = order.created_at.map_or(today, |d| d.date_naive());
        let in_transit = !matches!(
            status,
            ItemStatus::Delivered | ItemStatus::Cancelled | ItemStatus::Unknown
        );

        Self {
            path: order_path(&order.id),
            code: order.id.short_code(),
            placed_on: order.created_at.map(|d| long_date(d.date_naive())),
            status: status.label(),
            tone: status_tone(status),
            timeline: timeline(status),
            estimated_delivery: in_transit.then(|| long_date(estimated_delivery(placed))),
            shipping: order
                .shipping_address
                .as_ref()
                .and_then(|s| s.address())
                .map(|a| ShippingView {
                    full_name: a.full_name.clone(),
                    lines: [a.house_number.as_str(), a.street.as_str(), a.landmark.as_str()]
                        .into_iter()
                        .filter(|l| !l.trim().is_empty())
                        .map(str::to_owned)
                        .chain(std::iter::once(a.locality()))
                        .collect(),
                    mobile: a.mobile_number.clone(),
                }),
            payment_method: order.payment_method.label(),
            payment_status: order.payment_status.label(),
            total: order.total_amount.to_string(),
            coupon_code: order.coupon.as_ref().and_then(|c| c.code.clone()),
            coupon_discount: order.coupon_discount().map(|d| d.to_string()),
            payable: order.payable().to_string(),
            items: order.items.iter().map(OrderItemView::from).collect(),
        }
    }
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/order.html")]
pub struct OrderTemplate {
    pub layout: Layout,
    pub order: Option<OrderDetailView>,
    pub error: String,
    pub reasons: &'static [&'static str],
    pub other_reason: &'static str,
    pub max_images: usize,
    pub ratings: &'static [u8],
}

/// Display one order.
#[instrument(skip(state, session, shopper))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = OrderId::new(id);
    let (layout, order) = tokio::join!(
        Layout::load(&state, &session),
        state.api().order(&id, Some(&shopper.token))
    );

    let (order, error) = match order {
        Ok(order) => (
            Some(OrderDetailView::new(&order, Utc::now().date_naive())),
            String::new(),
        ),
        Err(e) if e.kind() == ErrorKind::NotFound => (None, "Order not found".to_string()),
        Err(e) => {
            tracing::error!(error = %e, order_id = %id, "Failed to load order");
            (None, ORDER_LOAD_FAILED.to_string())
        }
    };

    OrderTemplate {
        layout,
        order,
        error,
        reasons: &CANCELLATION_REASONS,
        other_reason: OTHER_REASON,
        max_images: MAX_REVIEW_IMAGES,
        ratings: &[5, 4, 3, 2, 1],
    }
}

/// Ask for one item to be cancelled.
#[instrument(skip(state, session, shopper, form))]
pub async fn cancel_item(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Path((id, item_id)): Path<(String, String)>,
    Form(form): Form<CancelForm>,
) -> Result<Response> {
    let order_id = OrderId::new(id);
    let item_id = OrderItemId::new(item_id);
    let back = order_path(&order_id);

    let request = match form.into_request() {
        Ok(request) => request,
        Err(e) => {
            Flash::error(&session, e.to_string()).await?;
            return Ok(Redirect::to(&back).into_response());
        }
    };

    match state
        .api()
        .request_cancellation(&order_id, &item_id, &request, Some(&shopper.token))
        .await
    {
        Ok(()) => {
            tracing::info!(order_id = %order_id, item_id = %item_id, "Cancellation requested");
            Flash::success(&session, CANCELLATION_SUBMITTED).await?;
        }
        Err(e) => {
            tracing::error!(error = %e, order_id = %order_id, item_id = %item_id, "Cancellation request failed");
            Flash::error(&session, e.user_message(CANCELLATION_FAILED)).await?;
        }
    }
    Ok(Redirect::to(&back).into_response())
}

// =============================================================================
// Reviews
// =============================================================================

/// A review form as posted, before validation.
#[derive(Debug, Default)]
pub struct ReviewUpload {
    pub product_id: String,
    pub rating: u32,
    pub comment: String,
    pub images: Vec<ReviewImage>,
}

impl ReviewUpload {
    /// Read the multipart body. Empty file inputs and non-image parts are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] when the body is not valid multipart.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let bad_request = |e: axum::extract::multipart::MultipartError| {
            AppError::BadRequest(e.body_text())
        };
        let mut upload = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "productId" => upload.product_id = field.text().await.map_err(bad_request)?,
                "rating" => {
                    let raw = field.text().await.map_err(bad_request)?;
                    upload.rating = raw.trim().parse().unwrap_or(0);
                }
                "comment" => upload.comment = field.text().await.map_err(bad_request)?,
                "images" => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let content_type = field.content_type().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await.map_err(bad_request)?;
                    if !bytes.is_empty() && content_type.starts_with("image/") {
                        upload.images.push(ReviewImage {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(upload)
    }
}

/// Review a delivered item.
#[instrument(skip(state, session, shopper, multipart))]
pub async fn submit_review(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let back = order_path(&OrderId::new(id));
    let upload = ReviewUpload::read(multipart).await?;

    if upload.product_id.trim().is_empty() {
        return Err(AppError::BadRequest("Missing product".to_string()));
    }
    if let Err(e) = validate_review(upload.rating, &upload.comment, upload.images.len()) {
        Flash::error(&session, e.to_string()).await?;
        return Ok(Redirect::to(&back).into_response());
    }

    let review = NewReview {
        product_id: ProductId::new(upload.product_id.trim()),
        rating: upload.rating,
        comment: upload.comment.trim().to_owned(),
        images: upload.images,
    };
    match state.api().submit_review(review, Some(&shopper.token)).await {
        Ok(_) => Flash::success(&session, REVIEW_SUBMITTED).await?,
        Err(e) => {
            tracing::error!(error = %e, "Failed to submit review");
            Flash::error(&session, e.user_message(REVIEW_FAILED)).await?;
        }
    }
    Ok(Redirect::to(&back).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(statuses: &[&str]) -> Order {
        let items: Vec<_> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| {
                json!({"_id": format!("i{i}"), "quantity": 1, "size": "M", "price": 500,
                       "status": s, "product": {"_id": format!("p{i}"), "productName": "Tee"}})
            })
            .collect();
        serde_json::from_value(json!({
            "_id": "665a0c9e41f2b3d4e5f6a7b8",
            "items": items,
            "totalAmount": 1000,
            "coupon": {"code": "SAVE10", "discount": 100},
            "paymentMethod": "cod",
            "createdAt": "2025-10-25T08:00:00Z",
            "shippingAddress": {"_id": "a1", "fullName": "Asha", "houseNumber": "12",
                                "street": "MG Road", "city": "Pune", "state": "Maharashtra",
                                "pincode": "411001", "mobileNumber": "9876543210"}
        }))
        .unwrap()
    }

    #[test]
    fn test_timeline_progress() {
        let steps = timeline(ItemStatus::Shipped);
        let reached: Vec<_> = steps.iter().map(|s| s.reached).collect();
        assert_eq!(reached, vec![true, true, true, false]);
        assert!(timeline(ItemStatus::Cancelled).iter().all(|s| !s.reached));
    }

    #[test]
    fn test_detail_view_in_transit() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 30).unwrap();
        let view = OrderDetailView::new(&order(&["placed", "shipped"]), today);
        assert_eq!(view.code, "E5F6A7B8");
        assert_eq!(view.status, "Shipped");
        assert_eq!(
            view.estimated_delivery.as_deref(),
            Some("Tuesday, 4 November 2025")
        );
        assert_eq!(view.coupon_discount.as_deref(), Some("₹100"));
        assert_eq!(view.payable, "₹900");
        assert_eq!(view.payment_method, "Cash on Delivery");

        let shipping = view.shipping.unwrap();
        assert_eq!(shipping.lines, vec!["12", "MG Road", "Pune, Maharashtra - 411001"]);

        let first = view.items.first().unwrap();
        assert!(first.can_cancel);
        assert!(!first.can_review);
    }

    #[test]
    fn test_delivered_order_has_no_estimate() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 30).unwrap();
        let view = OrderDetailView::new(&order(&["delivered", "delivered"]), today);
        assert_eq!(view.status, "Delivered");
        assert_eq!(view.estimated_delivery, None);
        assert!(view.items.iter().all(|i| i.can_review && !i.can_cancel));
    }

    #[test]
    fn test_summary_view() {
        let view = OrderSummaryView::from(&order(&["processing"]));
        assert_eq!(view.href, "/orders/665a0c9e41f2b3d4e5f6a7b8");
        assert_eq!(view.date.as_deref(), Some("25 Oct 2025"));
        assert_eq!(view.status, "Processing");
        assert_eq!(view.tone, "warning");
        assert_eq!(view.item_count, 1);
    }
}
