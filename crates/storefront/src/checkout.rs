//! Cart totals, order payloads and payment hand-off.
//!
//! Amounts here are display and request values only. The backend
//! recomputes prices and validates coupons when the order is placed.

use chrono::{DateTime, SecondsFormat, Utc};
use macstorm_core::{AddressId, DepositId, OrderId, Price};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::{Cart, CreateOrder, DepositTransaction, GatewayTransaction, OrderLine};
use crate::api::{ApiError, ErrorKind};

pub const CURRENCY: &str = "INR";
pub const MERCHANT_NAME: &str = "MacStorm";
pub const PAYMENT_DESCRIPTION: &str = "Clothing Order Payment";
pub const THEME_COLOR: &str = "#f97316";

pub const COUPON_ALREADY_USED: &str =
    "This coupon has already been used. Please remove it and try again.";
pub const COUPON_INVALID: &str = "Coupon is no longer valid.";
pub const COUPON_REVALIDATION_FAILED: &str =
    "Coupon is no longer valid. Please remove it and try again.";
pub const ORDER_FAILED: &str = "Failed to place order. Please try again.";
pub const COD_PLACED: &str = "Order placed successfully! Pay when your order arrives.";
pub const COD_DEPOSIT_FAILED: &str =
    "We couldn't set up cash on delivery for this order. Please contact support.";
pub const PAYMENT_SUCCESS: &str = "Payment successful! Order confirmed.";
pub const PAYMENT_RECORD_FAILED: &str = "Payment successful but deposit update failed.";
pub const PAYMENT_INIT_FAILED: &str = "Failed to create order. Please try again.";
pub const PAYMENT_CANCELLED: &str = "Payment cancelled";

// =============================================================================
// Totals
// =============================================================================

/// Price breakdown of a cart before and after product discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of list prices.
    pub subtotal: Price,
    /// Savings from product markdowns.
    pub product_discount: Price,
    /// What the shopper pays before any coupon.
    pub after_product_discount: Price,
    pub total_items: u32,
}

impl CartTotals {
    /// Totals over the cart's live lines. Each figure rounds half up.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        let mut subtotal = Price::ZERO;
        let mut payable = Price::ZERO;
        let mut total_items = 0;

        for (item, product) in cart.lines() {
            subtotal = subtotal + product.list_price().times(item.quantity);
            payable = payable + product.price.times(item.quantity);
            total_items += item.quantity;
        }

        // A line priced above its list price offsets the markdowns on others
        Self {
            subtotal: subtotal.rounded(),
            product_discount: subtotal.saturating_sub(payable).rounded(),
            after_product_discount: payable.rounded(),
            total_items,
        }
    }

    /// Payable amount after a coupon, never below zero.
    #[must_use]
    pub fn final_total(&self, coupon_discount: Price) -> Price {
        self.after_product_discount.saturating_sub(coupon_discount)
    }

    #[must_use]
    pub fn total_savings(&self, coupon_discount: Price) -> Price {
        self.product_discount + coupon_discount
    }
}

// =============================================================================
// Coupons
// =============================================================================

/// A coupon accepted by `/coupon/apply`, kept in the session until the
/// cart changes or an order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount: Price,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl AppliedCoupon {
    /// Toast shown after a successful apply.
    #[must_use]
    pub fn applied_message(&self) -> String {
        format!("Coupon applied successfully! Discount: {}", self.discount)
    }
}

/// Trim a coupon code typed by the shopper. The backend matches it as typed.
#[must_use]
pub fn normalize_coupon_code(raw: &str) -> Option<String> {
    let code = raw.trim();
    (!code.is_empty()).then(|| code.to_owned())
}

// =============================================================================
// Order draft
// =============================================================================

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Please select a delivery address")]
    NoAddress,
    #[error("Your cart is empty")]
    EmptyCart,
}

/// Builds the `POST /orders/create` body from the cart.
pub struct OrderDraft;

impl OrderDraft {
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoAddress`] when no address is selected and
    /// [`CheckoutError::EmptyCart`] when the cart has no live lines.
    pub fn build(
        cart: &Cart,
        address: Option<&AddressId>,
        coupon: Option<&AppliedCoupon>,
    ) -> Result<CreateOrder, CheckoutError> {
        let address = address.ok_or(CheckoutError::NoAddress)?;
        let items: Vec<OrderLine> = cart
            .lines()
            .map(|(item, product)| OrderLine {
                product: product.id.clone(),
                quantity: item.quantity,
                size: item.size.clone(),
                price: product.price,
            })
            .collect();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        Ok(CreateOrder {
            items,
            shipping_address: address.clone(),
            total_amount: CartTotals::from_cart(cart).after_product_discount,
            coupon_code: coupon.map(|c| c.code.clone()),
        })
    }
}

/// What to tell the shopper when `create_order` fails, and whether the
/// applied coupon must be dropped.
#[must_use]
pub fn order_failure(err: &ApiError) -> (String, bool) {
    match err.kind() {
        ErrorKind::CouponAlreadyUsed => (COUPON_ALREADY_USED.to_string(), true),
        ErrorKind::Coupon => (err.user_message(COUPON_INVALID), true),
        _ => (ORDER_FAILED.to_string(), false),
    }
}

// =============================================================================
// Payment
// =============================================================================

/// An order awaiting the gateway callback. Held in the session between
/// the hand-off page and the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub order_id: OrderId,
    pub deposit_id: DepositId,
    pub amount: Price,
    /// Gateway form prefill from the delivery address.
    #[serde(default)]
    pub prefill_name: String,
    #[serde(default)]
    pub prefill_contact: String,
}

/// Fields the gateway posts back after a successful payment.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayCallback {
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_order_id: String,
    #[serde(default)]
    pub razorpay_signature: String,
}

/// Local payment reference, `razorpay_ref_` plus 9 random base-36 characters.
#[must_use]
pub fn payment_reference() -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
        .map(|&b| char::from(b))
        .collect();
    format!("razorpay_ref_{suffix}")
}

/// The deposit update recorded once the gateway confirms payment.
#[must_use]
pub fn deposit_transaction(
    callback: &GatewayCallback,
    amount: Price,
    paid_at: DateTime<Utc>,
    reference: String,
) -> DepositTransaction {
    DepositTransaction {
        transaction_id: callback.razorpay_payment_id.clone(),
        transaction: GatewayTransaction {
            gateway: "Razorpay",
            payment_time: paid_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            reference,
            razorpay_payment_id: callback.razorpay_payment_id.clone(),
            razorpay_order_id: callback.razorpay_order_id.clone(),
            razorpay_signature: callback.razorpay_signature.clone(),
            amount,
            currency: CURRENCY,
        },
        status: true,
    }
}
