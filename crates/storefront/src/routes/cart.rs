//! Shopping bag route handlers.
//!
//! The bag page gathers the cart, saved addresses and active coupons in
//! one render. Mutations are form posts that answer with a redirect back to
//! the bag; adding from a product page may also come in over HTMX.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use macstorm_core::{CartItemId, Price, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::feedback::{CART_UPDATED, Reply};
use super::layout::{BadgeTemplate, Layout};
use super::products::{SELECT_SIZE, check_quantity, max_quantity, orderable_size};
use crate::addresses::default_address;
use crate::api::types::{AddToCart, Address, Cart, CartItem, Coupon, Product};
use crate::checkout::{AppliedCoupon, CartTotals, normalize_coupon_code};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::session::{applied_coupon, drop_coupon, set_coupon};
use crate::models::{Badges, Flash, FlashKind};
use crate::state::AppState;

pub const ADDED: &str = "Product added to cart successfully!";
pub const ADD_FAILED: &str = "Failed to add product to cart";
pub const UPDATED: &str = "Cart updated";
pub const UPDATE_FAILED: &str = "Failed to update quantity";
pub const REMOVED: &str = "Item removed from cart";
pub const REMOVE_FAILED: &str = "Failed to remove item";
pub const CLEARED: &str = "Cart cleared";
pub const CLEAR_FAILED: &str = "Failed to clear cart";
pub const COUPON_REQUIRED: &str = "Please enter a coupon code";
pub const COUPON_FAILED: &str = "Failed to apply coupon";
pub const COUPON_REMOVED: &str = "Coupon removed successfully";
pub const CART_EMPTY: &str = "Cart is empty";
pub const LOAD_FAILED: &str = "Failed to load cart";

const CART_PATH: &str = "/cart";

// =============================================================================
// Views
// =============================================================================

/// One bag line for templates.
pub struct CartLineView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub brand: String,
    pub image: Option<String>,
    pub size_label: String,
    pub quantity: u32,
    pub max_quantity: u32,
    pub price: String,
    pub list_price: Option<String>,
    pub line_total: String,
}

impl CartLineView {
    fn new(item: &CartItem, product: &Product) -> Self {
        Self {
            id: item.id.to_string(),
            href: format!(
                "/product/{}?size={}",
                urlencoding::encode(product.id.as_str()),
                urlencoding::encode(&item.size)
            ),
            name: product.product_name.clone(),
            brand: product.brand.clone(),
            image: product.primary_image().map(|i| i.url.clone()),
            size_label: item.size_label().to_owned(),
            quantity: item.quantity,
            max_quantity: max_quantity(product.size(&item.size)),
            price: product.price.to_string(),
            list_price: product
                .has_markdown()
                .then(|| product.list_price().to_string()),
            line_total: product.price.times(item.quantity).to_string(),
        }
    }
}

/// The price summary box.
pub struct TotalsView {
    pub subtotal: String,
    pub product_discount: Option<String>,
    pub coupon_discount: Option<String>,
    pub final_total: String,
    pub savings: Option<String>,
    pub total_items: u32,
}

fn nonzero(price: Price) -> Option<String> {
    (!price.is_zero()).then(|| price.to_string())
}

impl TotalsView {
    #[must_use]
    pub fn new(totals: &CartTotals, coupon_discount: Price) -> Self {
        Self {
            subtotal: totals.subtotal.to_string(),
            product_discount: nonzero(totals.product_discount),
            coupon_discount: nonzero(coupon_discount),
            final_total: totals.final_total(coupon_discount).to_string(),
            savings: nonzero(totals.total_savings(coupon_discount)),
            total_items: totals.total_items,
        }
    }
}

/// An offer in the "Available coupons" list.
pub struct CouponView {
    pub code: String,
    pub headline: String,
    pub description: Option<String>,
    pub min_order: Option<String>,
    pub cap: Option<String>,
    pub expires: Option<String>,
}

impl From<&Coupon> for CouponView {
    fn from(coupon: &Coupon) -> Self {
        Self {
            code: coupon.code.clone(),
            headline: coupon.headline(),
            description: coupon.description.clone().filter(|d| !d.trim().is_empty()),
            min_order: coupon.min_order_amount.map(|p| format!("Min. order {p}")),
            cap: coupon.cap().map(|p| format!("Up to {p}")),
            expires: coupon
                .expiry_date
                .map(|d| format!("Valid till {}", d.format("%-d %b %Y"))),
        }
    }
}

/// A delivery address radio button.
pub struct AddressOption {
    pub id: String,
    pub full_name: String,
    pub street_line: String,
    pub locality: String,
    pub mobile: String,
    pub is_default: bool,
    pub selected: bool,
}

impl AddressOption {
    fn new(address: &Address, selected: bool) -> Self {
        let street_line = [&address.house_number, &address.street, &address.landmark]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: address.id.to_string(),
            full_name: address.full_name.clone(),
            street_line,
            locality: address.locality(),
            mobile: address.mobile_number.clone(),
            is_default: address.is_default,
            selected,
        }
    }
}

/// Radio options with `requested` checked, else the default address.
#[must_use]
pub fn address_options(addresses: &[Address], requested: Option<&str>) -> Vec<AddressOption> {
    let selected = requested
        .and_then(|id| addresses.iter().find(|a| a.id.as_str() == id))
        .or_else(|| default_address(addresses))
        .map(|a| a.id.clone());
    addresses
        .iter()
        .map(|a| AddressOption::new(a, selected.as_ref() == Some(&a.id)))
        .collect()
}

// =============================================================================
// Bag page
// =============================================================================

/// Bag page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/cart.html")]
pub struct CartTemplate {
    pub layout: Layout,
    /// `None` when the cart failed to load.
    pub lines: Option<Vec<CartLineView>>,
    pub totals: TotalsView,
    pub coupon: Option<AppliedCoupon>,
    pub coupons: Vec<CouponView>,
    pub addresses: Vec<AddressOption>,
    pub online_payment: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CartQuery {
    /// Address picked on a previous render.
    #[serde(default)]
    pub address: Option<String>,
}

async fn store_cart_badge(session: &Session, cart: &Cart) {
    if let Err(e) = Badges::set_cart(session, cart.line_count()).await {
        tracing::warn!(error = %e, "Failed to cache cart badge");
    }
}

/// Display the bag.
///
/// Cart, addresses and coupons are fetched concurrently; each failure only
/// blanks its own section.
#[instrument(skip(state, session, shopper))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Query(query): Query<CartQuery>,
) -> impl IntoResponse {
    let token = Some(&shopper.token);
    let api = state.api();

    let (layout, cart, addresses, coupons) = tokio::join!(
        Layout::load(&state, &session),
        api.cart(token),
        api.addresses(token),
        api.active_coupons(token)
    );

    let cart = match cart {
        Ok(cart) => {
            store_cart_badge(&session, &cart).await;
            Some(cart)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load cart");
            None
        }
    };
    let addresses = addresses.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load addresses");
        Vec::new()
    });
    let coupons = coupons.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load coupons");
        Vec::new()
    });

    let coupon = applied_coupon(&session).await;
    let coupon_discount = coupon.as_ref().map_or(Price::ZERO, |c| c.discount);
    let totals = cart.as_ref().map(CartTotals::from_cart).unwrap_or_default();

    CartTemplate {
        layout,
        lines: cart.map(|cart| {
            cart.lines()
                .map(|(item, product)| CartLineView::new(item, product))
                .collect()
        }),
        totals: TotalsView::new(&totals, coupon_discount),
        coupon,
        coupons: coupons.iter().map(CouponView::from).collect(),
        addresses: address_options(&addresses, query.address.as_deref()),
        online_payment: state.config().razorpay_key_id.is_some(),
    }
}

/// Bag badge fragment (HTMX). Falls back to the cached count when the
/// cart cannot be fetched.
#[instrument(skip(state, session, auth))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
) -> impl IntoResponse {
    let count = match auth.token() {
        Some(token) => match state.api().cart(Some(token)).await {
            Ok(cart) => {
                store_cart_badge(&session, &cart).await;
                cart.line_count()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh cart badge");
                Badges::load(&session).await.cart
            }
        },
        None => 0,
    };

    BadgeTemplate {
        count,
        endpoint: "/cart/count",
        event: CART_UPDATED,
    }
}

// =============================================================================
// Mutations
// =============================================================================

/// Any change to the bag invalidates an applied coupon.
async fn reset_coupon(session: &Session) -> Option<Flash> {
    match drop_coupon(session).await {
        Ok(true) => Some(Flash {
            kind: FlashKind::Info,
            message: COUPON_REMOVED.to_string(),
        }),
        Ok(false) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to drop coupon");
            None
        }
    }
}

/// Add to bag form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Add a product in one size to the bag.
///
/// The product is re-read so the size label and stock count come from the
/// backend rather than the form.
#[instrument(skip(state, session, headers, shopper))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(shopper): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let id = ProductId::new(form.product_id);
    let back = format!("/product/{}", urlencoding::encode(id.as_str()));

    let Some(code) = form.size.filter(|s| !s.trim().is_empty()) else {
        return Reply::error(SELECT_SIZE, back).send(&session, &headers).await;
    };
    let back = format!("{back}?size={}", urlencoding::encode(&code));

    let product = match state.api().product(&id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::error!(error = %e, product_id = %id, "Failed to load product for bag");
            return Reply::error(e.user_message(ADD_FAILED), back)
                .send(&session, &headers)
                .await;
        }
    };
    let Some(size) = orderable_size(&product, &code) else {
        return Reply::error(SELECT_SIZE, back).send(&session, &headers).await;
    };
    let quantity = match check_quantity(form.quantity.unwrap_or(1), max_quantity(Some(size))) {
        Ok(quantity) => quantity,
        Err(message) => return Reply::error(message, back).send(&session, &headers).await,
    };

    let input = AddToCart {
        product_id: id,
        size: size.size.clone(),
        size_label: size.label().to_owned(),
        quantity,
    };
    match state.api().add_to_cart(&input, Some(&shopper.token)).await {
        Ok(()) => {
            add_breadcrumb(
                "cart",
                "Added to bag",
                Some(&[
                    ("product_id", input.product_id.as_str()),
                    ("size", input.size.as_str()),
                ]),
            );
            Reply::success(ADDED, back).trigger(CART_UPDATED)
        }
        Err(e) => {
            tracing::error!(error = %e, product_id = %input.product_id, "Failed to add to bag");
            Reply::error(e.user_message(ADD_FAILED), back)
        }
    }
    .send(&session, &headers)
    .await
}

/// Quantity change form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: String,
    pub quantity: u32,
}

/// Change the quantity of one line.
#[instrument(skip(state, session, headers, shopper))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(shopper): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let id = CartItemId::new(form.item_id);
    let quantity = form.quantity.max(1);

    match state
        .api()
        .update_cart_item(&id, quantity, Some(&shopper.token))
        .await
    {
        Ok(cart) => {
            store_cart_badge(&session, &cart).await;
            Reply::success(UPDATED, CART_PATH)
                .and(reset_coupon(&session).await)
                .trigger(CART_UPDATED)
        }
        Err(e) => {
            tracing::error!(error = %e, item_id = %id, "Failed to update bag line");
            Reply::error(e.user_message(UPDATE_FAILED), CART_PATH)
        }
    }
    .send(&session, &headers)
    .await
}

/// Line removal form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: String,
}

/// Remove one line.
#[instrument(skip(state, session, headers, shopper))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(shopper): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let id = CartItemId::new(form.item_id);

    match state.api().remove_cart_item(&id, Some(&shopper.token)).await {
        Ok(cart) => {
            store_cart_badge(&session, &cart).await;
            Reply::success(REMOVED, CART_PATH)
                .and(reset_coupon(&session).await)
                .trigger(CART_UPDATED)
        }
        Err(e) => {
            tracing::error!(error = %e, item_id = %id, "Failed to remove bag line");
            Reply::error(e.user_message(REMOVE_FAILED), CART_PATH)
        }
    }
    .send(&session, &headers)
    .await
}

/// Empty the bag.
#[instrument(skip(state, session, headers, shopper))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(shopper): RequireAuth,
) -> Response {
    match state.api().clear_cart(Some(&shopper.token)).await {
        Ok(cart) => {
            store_cart_badge(&session, &cart).await;
            Reply::success(CLEARED, CART_PATH)
                .and(reset_coupon(&session).await)
                .trigger(CART_UPDATED)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to clear bag");
            Reply::error(e.user_message(CLEAR_FAILED), CART_PATH)
        }
    }
    .send(&session, &headers)
    .await
}

// =============================================================================
// Coupons
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub code: String,
}

/// The code to send to `/coupon/apply`, or the toast explaining why not.
fn coupon_request(raw: &str, cart: &Cart) -> Result<String, &'static str> {
    let code = normalize_coupon_code(raw).ok_or(COUPON_REQUIRED)?;
    if cart.lines().next().is_none() {
        return Err(CART_EMPTY);
    }
    Ok(code)
}

/// Validate a coupon against the bag and keep it in the session.
#[instrument(skip(state, session, headers, shopper))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(shopper): RequireAuth,
    Form(form): Form<CouponForm>,
) -> Response {
    let cart = match state.api().cart(Some(&shopper.token)).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load cart for coupon");
            return Reply::error(e.user_message(COUPON_FAILED), CART_PATH)
                .send(&session, &headers)
                .await;
        }
    };
    let code = match coupon_request(&form.code, &cart) {
        Ok(code) => code,
        Err(message) => {
            return Reply::error(message, CART_PATH)
                .send(&session, &headers)
                .await;
        }
    };

    let reply = match state.api().apply_coupon(&code, Some(&shopper.token)).await {
        Ok(applied) => {
            let coupon = AppliedCoupon {
                code: if applied.coupon_applied.trim().is_empty() {
                    code
                } else {
                    applied.coupon_applied
                },
                discount: applied.discount,
                details: applied.coupon_details,
            };
            match set_coupon(&session, &coupon).await {
                Ok(()) => Reply::success(coupon.applied_message(), CART_PATH),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to store coupon");
                    Reply::error(COUPON_FAILED, CART_PATH)
                }
            }
        }
        Err(e) => {
            tracing::info!(error = %e, coupon = %code, "Coupon rejected");
            Reply::error(e.user_message(COUPON_FAILED), CART_PATH)
        }
    };
    reply.send(&session, &headers).await
}

/// Drop the applied coupon.
#[instrument(skip(session, headers, _shopper))]
pub async fn remove_coupon(
    session: Session,
    headers: HeaderMap,
    RequireAuth(_shopper): RequireAuth,
) -> Response {
    if let Err(e) = drop_coupon(&session).await {
        tracing::warn!(error = %e, "Failed to drop coupon");
    }
    Reply::success(COUPON_REMOVED, CART_PATH)
        .send(&session, &headers)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn addresses() -> Vec<Address> {
        serde_json::from_value(json!([
            {"_id": "a1", "fullName": "Asha", "houseNumber": "12", "street": "MG Road",
             "city": "Pune", "state": "Maharashtra", "pincode": "411001"},
            {"_id": "a2", "fullName": "Ravi", "houseNumber": "4", "street": "Park St",
             "landmark": "Near mall", "city": "Kolkata", "state": "West Bengal",
             "pincode": "700016", "isDefault": true}
        ]))
        .unwrap()
    }

    #[test]
    fn test_coupon_needs_code_and_items() {
        let empty: Cart = serde_json::from_value(json!({
            "items": [{"_id": "c1", "quantity": 1, "size": "M", "product": null}]
        }))
        .unwrap();
        let filled: Cart = serde_json::from_value(json!({
            "items": [{"_id": "c1", "quantity": 1, "size": "M",
                       "product": {"_id": "p1", "price": 500}}]
        }))
        .unwrap();

        assert_eq!(coupon_request("  ", &filled), Err(COUPON_REQUIRED));
        assert_eq!(coupon_request("Save10", &empty), Err(CART_EMPTY));
        assert_eq!(coupon_request(" Save10 ", &filled), Ok("Save10".to_owned()));
    }

    #[test]
    fn test_default_address_is_preselected() {
        let options = address_options(&addresses(), None);
        let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.id.as_str()).collect();
        assert_eq!(selected, vec!["a2"]);
        assert_eq!(
            options.get(1).map(|o| o.street_line.as_str()),
            Some("4, Park St, Near mall")
        );
    }

    #[test]
    fn test_requested_address_wins() {
        let options = address_options(&addresses(), Some("a1"));
        assert!(options.first().unwrap().selected);
        assert!(!options.get(1).unwrap().selected);

        // Unknown ids fall back to the default.
        let options = address_options(&addresses(), Some("gone"));
        assert!(options.get(1).unwrap().selected);
    }

    #[test]
    fn test_totals_view_hides_zero_rows() {
        let cart: Cart = serde_json::from_value(json!({
            "items": [{"_id": "c1", "quantity": 2, "size": "M",
                       "product": {"_id": "p1", "price": 500}}]
        }))
        .unwrap();
        let totals = CartTotals::from_cart(&cart);

        let view = TotalsView::new(&totals, Price::ZERO);
        assert_eq!(view.subtotal, "₹1,000");
        assert_eq!(view.product_discount, None);
        assert_eq!(view.savings, None);

        let view = TotalsView::new(&totals, Price::from_rupees(100));
        assert_eq!(view.coupon_discount.as_deref(), Some("₹100"));
        assert_eq!(view.final_total, "₹900");
        assert_eq!(view.savings.as_deref(), Some("₹100"));
    }

    #[test]
    fn test_line_view_links_back_to_size() {
        let cart: Cart = serde_json::from_value(json!({
            "items": [{"_id": "c1", "quantity": 3, "size": "XL", "sizeLabel": "Extra Large",
                       "product": {"_id": "p1", "productName": "Tee", "price": 299,
                                   "sizes": [{"size": "XL", "inStock": true, "count": 6}]}}]
        }))
        .unwrap();
        let (item, product) = cart.lines().next().unwrap();
        let view = CartLineView::new(item, product);
        assert_eq!(view.href, "/product/p1?size=XL");
        assert_eq!(view.size_label, "Extra Large");
        assert_eq!(view.max_quantity, 6);
        assert_eq!(view.line_total, "₹897");
    }
}
