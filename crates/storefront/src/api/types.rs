//! Wire types for the MacStorm commerce API.
//!
//! Field names follow the backend's JSON exactly (`_id`, `productName`,
//! `sizeLabel`, ...). Every field that the backend may omit carries a
//! default so a sparse document still renders.

use chrono::{DateTime, Utc};
use macstorm_core::{
    AddressId, CancellationStatus, CartItemId, CouponId, DepositId, DiscountType, ItemStatus,
    OrderId, OrderItemId, PaymentMethod, PaymentStatus, Price, ProductId, ReviewId, UserId,
};
use serde::{Deserialize, Serialize};

use super::de;

// =============================================================================
// Products
// =============================================================================

/// A product image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub url: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub alt: String,
}

/// Stock for one size of a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeStock {
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub size_label: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default, deserialize_with = "de::lenient_u32")]
    pub count: u32,
}

impl SizeStock {
    /// Label shown to shoppers, falling back to the size code.
    #[must_use]
    pub fn label(&self) -> &str {
        self.size_label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.size)
    }

    /// Orderable right now.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.in_stock && self.count > 0
    }
}

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub product_name: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    #[serde(default, deserialize_with = "de::lenient_u32")]
    pub discount: u32,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub images: Vec<ProductImage>,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub sizes: Vec<SizeStock>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub color: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub sub_category: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub product_type: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub product_description: String,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub features: Vec<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub product_details: serde_json::Map<String, serde_json::Value>,
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub rating: f64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Price before product discount. Falls back to the selling price.
    #[must_use]
    pub fn list_price(&self) -> Price {
        self.original_price
            .filter(|p| !p.is_zero())
            .unwrap_or(self.price)
    }

    /// Whether a struck-through list price should be shown.
    #[must_use]
    pub fn has_markdown(&self) -> bool {
        self.list_price() > self.price
    }

    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.first()
    }

    /// Second image for hover swaps, else the first.
    #[must_use]
    pub fn hover_image(&self) -> Option<&ProductImage> {
        self.images.get(1).or_else(|| self.images.first())
    }

    /// The first size that is in stock.
    #[must_use]
    pub fn default_size(&self) -> Option<&SizeStock> {
        self.sizes.iter().find(|s| s.in_stock)
    }

    #[must_use]
    pub fn size(&self, code: &str) -> Option<&SizeStock> {
        self.sizes.iter().find(|s| s.size == code)
    }

    /// `productDetails` with values rendered as plain strings.
    #[must_use]
    pub fn detail_rows(&self) -> Vec<(String, String)> {
        self.product_details
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect()
    }
}

// =============================================================================
// Navigation and home page
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub top_level: Vec<NavSection>,
}

/// Top-level menu entry (e.g. "men").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavSection {
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub categories: Vec<NavCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavCategory {
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub subcategories: Vec<NavSubcategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavSubcategory {
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "de::lenient_u32")]
    pub product_count: u32,
}

/// A home page section with its category tiles.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategorySection {
    #[serde(rename = "_id", default, deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub categories: Vec<CategoryTile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryTile {
    #[serde(rename = "_id", default, deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub image: String,
}

// =============================================================================
// Search
// =============================================================================

/// One facet value with the number of matching products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_u32")]
    pub count: u32,
}

impl FacetOption {
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// Facets as reported by `/search` under `availableFilters`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableFilters {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub colors: Vec<FacetOption>,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub sizes: Vec<FacetOption>,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub brands: Vec<FacetOption>,
    #[serde(default)]
    pub price_range: Option<(Price, Price)>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub products: Vec<Product>,
    #[serde(default)]
    pub available_filters: Option<AvailableFilters>,
}

/// An autocomplete entry. The backend sends either plain strings or
/// objects carrying a `value` or `productName`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Suggestion {
    Text(String),
    Entry {
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default, rename = "productName")]
        product_name: Option<String>,
        #[serde(default, rename = "type")]
        kind: Option<String>,
    },
}

impl Suggestion {
    /// The search term this entry stands for.
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Entry {
                value,
                name,
                product_name,
                ..
            } => value
                .as_deref()
                .or(product_name.as_deref())
                .or(name.as_deref()),
        }
        .filter(|s| !s.trim().is_empty())
    }

    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Entry { kind, .. } => kind.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Autocomplete {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub suggestions: Vec<Suggestion>,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub products: Vec<Product>,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub categories: Vec<Suggestion>,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub brands: Vec<Suggestion>,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub sub_categories: Vec<Suggestion>,
}

impl Autocomplete {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
            && self.products.is_empty()
            && self.categories.is_empty()
            && self.brands.is_empty()
            && self.sub_categories.is_empty()
    }
}

// =============================================================================
// Cart and wishlist
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: CartItemId,
    /// `null` when the product was removed from the catalog.
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default = "one", deserialize_with = "de::lenient_u32")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub size: String,
    #[serde(default)]
    pub size_label: Option<String>,
}

const fn one() -> u32 {
    1
}

impl CartItem {
    #[must_use]
    pub fn size_label(&self) -> &str {
        self.size_label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.size)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cart {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Drop items whose product no longer exists.
    #[must_use]
    pub fn without_missing_products(mut self) -> Self {
        self.items.retain(|item| item.product.is_some());
        self
    }

    /// Items with a live product, paired with it.
    pub fn lines(&self) -> impl Iterator<Item = (&CartItem, &Product)> {
        self.items
            .iter()
            .filter_map(|item| item.product.as_ref().map(|p| (item, p)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().next().is_none()
    }

    /// Number of distinct lines, as shown on the bag badge.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines().count()
    }
}

/// Body for `POST /cart/add`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    pub size: String,
    pub size_label: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wishlist {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub products: Vec<Product>,
}

// =============================================================================
// Addresses
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: AddressId,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub mobile_number: String,
    #[serde(default, alias = "houseNo", deserialize_with = "de::null_as_default")]
    pub house_number: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub street: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub landmark: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub pincode: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// `city, state - pincode`.
    #[must_use]
    pub fn locality(&self) -> String {
        format!("{}, {} - {}", self.city, self.state, self.pincode)
    }
}

/// Body for creating or updating an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub full_name: String,
    pub mobile_number: String,
    pub house_number: String,
    pub street: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
}

/// An order's shipping address: populated, or just the id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShippingAddress {
    Full(Box<Address>),
    Id(String),
}

impl ShippingAddress {
    #[must_use]
    pub fn address(&self) -> Option<&Address> {
        match self {
            Self::Full(a) => Some(a),
            Self::Id(_) => None,
        }
    }
}

// =============================================================================
// Coupons
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: CouponId,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub discount_value: Price,
    #[serde(default)]
    pub min_order_amount: Option<Price>,
    #[serde(default)]
    pub max_discount_amount: Option<Price>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Coupon {
    /// `20% OFF` or `₹150 OFF`.
    #[must_use]
    pub fn headline(&self) -> String {
        match self.discount_type {
            DiscountType::Percentage => format!("{}% OFF", self.discount_value.amount().normalize()),
            DiscountType::Fixed => format!("{} OFF", self.discount_value),
        }
    }

    /// The percentage cap, only meaningful for percentage coupons.
    #[must_use]
    pub fn cap(&self) -> Option<Price> {
        match self.discount_type {
            DiscountType::Percentage => self.max_discount_amount,
            DiscountType::Fixed => None,
        }
    }
}

/// Successful `POST /coupon/apply` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponApplication {
    #[serde(default)]
    pub coupon_applied: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub discount: Price,
    #[serde(default)]
    pub coupon_details: Option<serde_json::Value>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: OrderItemId,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default = "one", deserialize_with = "de::lenient_u32")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub size: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub price: Price,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub status: ItemStatus,
    #[serde(default)]
    pub cancellation_status: Option<CancellationStatus>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub cancellation_description: Option<String>,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

impl OrderItem {
    /// A cancellation request may be raised for this item.
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        self.status.is_cancellable() && self.cancellation_status.is_none()
    }

    /// Only delivered items can be reviewed.
    #[must_use]
    pub fn can_review(&self) -> bool {
        self.status == ItemStatus::Delivered && self.product.is_some()
    }

    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderCoupon {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub discount: Option<Price>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub total_amount: Price,
    #[serde(default)]
    pub final_amount: Option<Price>,
    #[serde(default)]
    pub coupon: Option<OrderCoupon>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub payment_method: PaymentMethod,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub order_status: Option<ItemStatus>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Status derived from the items, not the order-level field.
    #[must_use]
    pub fn overall_status(&self) -> ItemStatus {
        let statuses: Vec<ItemStatus> = self.items.iter().map(|i| i.status).collect();
        ItemStatus::aggregate(&statuses)
    }

    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    #[must_use]
    pub fn coupon_discount(&self) -> Option<Price> {
        self.coupon
            .as_ref()
            .and_then(|c| c.discount)
            .filter(|d| !d.is_zero())
    }

    /// Amount payable after any coupon.
    #[must_use]
    pub fn payable(&self) -> Price {
        self.final_amount.unwrap_or_else(|| {
            self.total_amount
                .saturating_sub(self.coupon_discount().unwrap_or(Price::ZERO))
        })
    }
}

/// One line of an order creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product: ProductId,
    pub quantity: u32,
    pub size: String,
    pub price: Price,
}

/// Body for `POST /orders/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub items: Vec<OrderLine>,
    pub shipping_address: AddressId,
    /// Amount after product discounts, before the coupon.
    pub total_amount: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

/// Body for the item cancellation request.
#[derive(Debug, Clone, Serialize)]
pub struct CancellationRequest {
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =============================================================================
// Deposits (payment records)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Deposit {
    #[serde(rename = "_id")]
    pub id: DepositId,
}

/// Body for `POST /deposit`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeposit {
    pub order_id: OrderId,
    pub payment_method: &'static str,
}

/// Gateway details recorded against a deposit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayTransaction {
    pub gateway: &'static str,
    pub payment_time: String,
    pub reference: String,
    pub razorpay_payment_id: String,
    pub razorpay_order_id: String,
    pub razorpay_signature: String,
    pub amount: Price,
    pub currency: &'static str,
}

/// Body for `PUT /deposit/{id}/transaction`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositTransaction {
    pub transaction_id: String,
    pub transaction: GatewayTransaction,
    pub status: bool,
}

// =============================================================================
// Reviews
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthor {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    #[serde(default, deserialize_with = "de::lenient_u32")]
    pub rating: u32,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub images: Vec<String>,
    #[serde(default)]
    pub user: Option<ReviewAuthor>,
    #[serde(default)]
    pub is_verified_purchase: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    #[must_use]
    pub fn author(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.full_name.as_deref())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Anonymous")
    }
}

/// An uploaded review photo.
#[derive(Debug, Clone)]
pub struct ReviewImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Auth
// =============================================================================

/// The signed-in user's profile as returned by login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// First name for the greeting, else "there".
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.full_name
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
            .unwrap_or("there")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordReset {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

// =============================================================================
// Inquiry
// =============================================================================

/// Body for `POST /inquiry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default = "Inquiry::default_type")]
    pub inquiry_type: String,
}

impl Inquiry {
    fn default_type() -> String {
        "general".to_string()
    }
}

/// Generic `{ message }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_json() -> serde_json::Value {
        json!({
            "_id": "p1",
            "productName": "Linen Shirt",
            "brand": "MacStorm",
            "price": 1299,
            "originalPrice": 1999,
            "discount": 35,
            "images": [{"url": "/a.jpg", "alt": "front"}, null],
            "sizes": [
                {"size": "S", "sizeLabel": "Small", "inStock": false, "count": 0},
                {"size": "M", "inStock": true, "count": "4"}
            ],
            "color": "white",
            "category": "men",
            "subCategory": "shirts",
            "productType": "casual",
            "productDetails": {"Fabric": "Linen", "Pockets": 1},
            "rating": 4.4,
            "isFeatured": true,
            "createdAt": "2025-03-01T10:00:00.000Z"
        })
    }

    #[test]
    fn test_product_parses_backend_shape() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.sizes.get(1).unwrap().count, 4);
        assert_eq!(product.default_size().unwrap().size, "M");
        assert_eq!(product.default_size().unwrap().label(), "M");
        assert!(product.has_markdown());
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_sparse_product() {
        let product: Product =
            serde_json::from_value(json!({"_id": "p2", "price": null, "brand": null})).unwrap();
        assert!(product.price.is_zero());
        assert_eq!(product.list_price(), product.price);
        assert!(product.default_size().is_none());
        assert!(product.hover_image().is_none());
    }

    #[test]
    fn test_detail_rows_stringify_values() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        let rows = product.detail_rows();
        assert!(rows.contains(&("Fabric".to_string(), "Linen".to_string())));
        assert!(rows.contains(&("Pockets".to_string(), "1".to_string())));
    }

    #[test]
    fn test_cart_drops_missing_products() {
        let cart: Cart = serde_json::from_value(json!({
            "items": [
                {"_id": "c1", "product": product_json(), "quantity": 2, "size": "M"},
                {"_id": "c2", "product": null, "quantity": 1, "size": "L"}
            ]
        }))
        .unwrap();
        assert_eq!(cart.line_count(), 1);
        let cart = cart.without_missing_products();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().unwrap().size_label(), "M");
    }

    #[test]
    fn test_add_to_cart_field_names() {
        let body = serde_json::to_value(AddToCart {
            product_id: ProductId::new("p1"),
            size: "M".into(),
            size_label: "Medium".into(),
            quantity: 1,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"productId": "p1", "size": "M", "sizeLabel": "Medium", "quantity": 1})
        );
    }

    #[test]
    fn test_create_order_omits_missing_coupon() {
        let order = CreateOrder {
            items: vec![],
            shipping_address: AddressId::new("a1"),
            total_amount: Price::from_rupees(500),
            coupon_code: None,
        };
        let body = serde_json::to_value(order).unwrap();
        assert!(body.get("couponCode").is_none());
        assert_eq!(body.get("shippingAddress").unwrap(), "a1");
    }

    #[test]
    fn test_order_overall_status_and_payable() {
        let order: Order = serde_json::from_value(json!({
            "_id": "o1",
            "items": [
                {"_id": "i1", "status": "delivered", "price": 100, "quantity": 1},
                {"_id": "i2", "status": "shipped", "price": 50, "quantity": 2}
            ],
            "totalAmount": 200,
            "coupon": {"code": "SAVE", "discount": 30},
            "paymentMethod": "cod",
            "shippingAddress": "a1"
        }))
        .unwrap();
        assert_eq!(order.overall_status(), ItemStatus::Shipped);
        assert_eq!(order.total_quantity(), 3);
        assert_eq!(order.payable(), Price::from_rupees(170));
        assert!(order.shipping_address.unwrap().address().is_none());
    }

    #[test]
    fn test_order_item_actions() {
        let item: OrderItem = serde_json::from_value(json!({
            "_id": "i1", "status": "placed", "cancellationStatus": "pending"
        }))
        .unwrap();
        assert!(!item.can_cancel());

        let item: OrderItem =
            serde_json::from_value(json!({"_id": "i2", "status": "processing"})).unwrap();
        assert!(item.can_cancel());
        assert!(!item.can_review());
    }

    #[test]
    fn test_suggestion_terms() {
        let list: Vec<Suggestion> = serde_json::from_value(json!([
            "shirt",
            {"type": "brand", "value": "MacStorm"},
            {"productName": "Linen Shirt"},
            {"type": "empty"}
        ]))
        .unwrap();
        let terms: Vec<_> = list.iter().filter_map(Suggestion::term).collect();
        assert_eq!(terms, vec!["shirt", "MacStorm", "Linen Shirt"]);
        assert_eq!(list.get(1).unwrap().kind(), Some("brand"));
    }

    #[test]
    fn test_coupon_headline() {
        let pct: Coupon = serde_json::from_value(json!({
            "_id": "c1", "code": "TEN", "discountType": "percentage",
            "discountValue": 10, "maxDiscountAmount": 200
        }))
        .unwrap();
        assert_eq!(pct.headline(), "10% OFF");
        assert_eq!(pct.cap(), Some(Price::from_rupees(200)));

        let fixed: Coupon = serde_json::from_value(json!({
            "_id": "c2", "code": "FLAT", "discountType": "fixed", "discountValue": 1500
        }))
        .unwrap();
        assert_eq!(fixed.headline(), "₹1,500 OFF");
        assert_eq!(fixed.cap(), None);
    }

    #[test]
    fn test_user_accepts_id_alias() {
        let user: User =
            serde_json::from_value(json!({"id": "u1", "fullName": "Asha Rao"})).unwrap();
        assert_eq!(user.id.as_ref().unwrap().as_str(), "u1");
        assert_eq!(user.first_name(), "Asha");
    }
}
