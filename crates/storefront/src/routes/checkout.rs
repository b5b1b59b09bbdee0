//! Placing orders and the Razorpay hand-off.
//!
//! Flow:
//! 1. `POST /checkout` re-validates the coupon, creates the order and opens
//!    a deposit.
//! 2. Cash on delivery finishes there. Online payment stores a
//!    [`PendingPayment`] and redirects to the hand-off page, which opens the
//!    gateway's checkout widget.
//! 3. The widget posts its result to `/checkout/razorpay/callback`, which
//!    records the transaction against the deposit.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use macstorm_core::{OrderId, PaymentMethod};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::cart::LOAD_FAILED;
use super::layout::Layout;
use crate::api::SessionToken;
use crate::checkout::{
    AppliedCoupon, COD_DEPOSIT_FAILED, COD_PLACED, COUPON_REVALIDATION_FAILED, CURRENCY, GatewayCallback,
    MERCHANT_NAME, OrderDraft, PAYMENT_CANCELLED, PAYMENT_DESCRIPTION, PAYMENT_INIT_FAILED,
    PAYMENT_RECORD_FAILED, PAYMENT_SUCCESS, PendingPayment, THEME_COLOR, deposit_transaction,
    order_failure, payment_reference,
};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::session::{
    applied_coupon, drop_coupon, pending_payment, set_coupon, set_pending_payment,
    take_pending_payment,
};
use crate::models::{Badges, Flash};
use crate::state::AppState;

pub const SELECT_PAYMENT: &str = "Please select a payment method";
pub const VALIDATION_FAILED: &str = "Failed to validate order. Please try again.";
pub const GATEWAY_UNAVAILABLE: &str = "Razorpay SDK failed to load. Please refresh the page.";

fn order_path(id: &OrderId) -> String {
    format!("/orders/{}", urlencoding::encode(id.as_str()))
}

async fn fail(session: &Session, message: impl Into<String>, to: &str) -> Result<Response> {
    Flash::error(session, message).await?;
    Ok(Redirect::to(to).into_response())
}

/// Toasts for a placed cash-on-delivery order.
async fn cod_placed(session: &Session, deposit_opened: bool) -> Result<()> {
    Flash::success(session, COD_PLACED).await?;
    if !deposit_opened {
        Flash::info(session, COD_DEPOSIT_FAILED).await?;
    }
    Ok(())
}

/// Empty the bag and forget the coupon once an order is placed.
async fn finish_order(state: &AppState, session: &Session, token: &SessionToken) -> Result<()> {
    if let Err(e) = state.api().clear_cart(Some(token)).await {
        tracing::warn!(error = %e, "Failed to clear bag after order");
    }
    drop_coupon(session).await?;
    Badges::set_cart(session, 0).await?;
    Ok(())
}

/// Re-check the applied coupon against the current bag.
///
/// Returns the coupon with its fresh discount, or the message to show.
/// A rejected coupon is dropped; a transport failure keeps it.
async fn revalidate_coupon(
    state: &AppState,
    session: &Session,
    token: &SessionToken,
    coupon: AppliedCoupon,
) -> Result<std::result::Result<AppliedCoupon, String>> {
    match state.api().apply_coupon(&coupon.code, Some(token)).await {
        Ok(applied) => {
            let fresh = AppliedCoupon {
                discount: applied.discount,
                details: applied.coupon_details.or(coupon.details),
                code: coupon.code,
            };
            set_coupon(session, &fresh).await?;
            Ok(Ok(fresh))
        }
        Err(e) if e.is_transport() => {
            tracing::error!(error = %e, "Coupon re-validation failed");
            Ok(Err(VALIDATION_FAILED.to_string()))
        }
        Err(e) => {
            tracing::info!(error = %e, coupon = %coupon.code, "Coupon no longer valid");
            drop_coupon(session).await?;
            Ok(Err(e.user_message(COUPON_REVALIDATION_FAILED)))
        }
    }
}

/// Checkout form posted from the bag.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub address_id: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Place an order.
#[instrument(skip(state, session, shopper, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let token = &shopper.token;
    let api = state.api();

    let Some(method) = form
        .payment_method
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .map(PaymentMethod::parse)
    else {
        return fail(&session, SELECT_PAYMENT, "/cart").await;
    };
    if method == PaymentMethod::Razorpay && state.config().razorpay_key_id.is_none() {
        return fail(&session, GATEWAY_UNAVAILABLE, "/cart").await;
    }

    let (cart, addresses) = tokio::join!(api.cart(Some(token)), api.addresses(Some(token)));
    let cart = match cart {
        Ok(cart) => cart,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load bag for checkout");
            return fail(&session, LOAD_FAILED, "/cart").await;
        }
    };
    let addresses = addresses.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load addresses for checkout");
        Vec::new()
    });
    let address = form
        .address_id
        .as_deref()
        .and_then(|id| addresses.iter().find(|a| a.id.as_str() == id));

    let coupon = match applied_coupon(&session).await {
        Some(coupon) => match revalidate_coupon(&state, &session, token, coupon).await? {
            Ok(coupon) => Some(coupon),
            Err(message) => return fail(&session, message, "/cart").await,
        },
        None => None,
    };

    let draft = match OrderDraft::build(&cart, address.map(|a| &a.id), coupon.as_ref()) {
        Ok(draft) => draft,
        Err(e) => return fail(&session, e.to_string(), "/cart").await,
    };

    let order = match api.create_order(&draft, Some(token)).await {
        Ok(order) => order,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create order");
            let (message, drop) = order_failure(&e);
            if drop {
                drop_coupon(&session).await?;
            }
            return fail(&session, message, "/cart").await;
        }
    };
    tracing::info!(order_id = %order.id, method = ?method, "Order created");
    add_breadcrumb(
        "checkout",
        "Order created",
        Some(&[("order_id", order.id.as_str())]),
    );

    match method {
        PaymentMethod::Cod => {
            let deposit = api.create_deposit(&order.id, method, Some(token)).await;
            if let Err(e) = &deposit {
                tracing::error!(error = %e, order_id = %order.id, "Failed to open COD deposit");
            }
            finish_order(&state, &session, token).await?;
            cod_placed(&session, deposit.is_ok()).await?;
            Ok(Redirect::to(&order_path(&order.id)).into_response())
        }
        PaymentMethod::Razorpay | PaymentMethod::Unknown => {
            let deposit_id = match api.create_deposit(&order.id, method, Some(token)).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::error!(error = %e, order_id = %order.id, "Failed to open deposit");
                    return fail(&session, PAYMENT_INIT_FAILED, "/cart").await;
                }
            };
            let pending = PendingPayment {
                amount: order.payable(),
                order_id: order.id,
                deposit_id,
                prefill_name: address.map(|a| a.full_name.clone()).unwrap_or_default(),
                prefill_contact: address.map(|a| a.mobile_number.clone()).unwrap_or_default(),
            };
            set_pending_payment(&session, &pending).await?;
            Ok(Redirect::to("/checkout/razorpay").into_response())
        }
    }
}

/// Gateway hand-off page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/razorpay.html")]
pub struct RazorpayTemplate {
    pub layout: Layout,
    pub key: String,
    pub amount: String,
    pub amount_paise: u64,
    pub currency: &'static str,
    pub merchant: &'static str,
    pub description: &'static str,
    pub order_code: String,
    pub prefill_name: String,
    pub prefill_email: String,
    pub prefill_contact: String,
    pub theme: &'static str,
    pub gateway_unavailable: &'static str,
}

/// Open the gateway's checkout widget for the pending order.
#[instrument(skip(state, session, shopper))]
pub async fn razorpay(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
) -> Result<Response> {
    let Some(pending) = pending_payment(&session).await else {
        return Ok(Redirect::to("/cart").into_response());
    };
    let Some(key) = state.config().razorpay_key_id.clone() else {
        return fail(&session, GATEWAY_UNAVAILABLE, "/cart").await;
    };

    let layout = Layout::load(&state, &session).await;
    Ok(RazorpayTemplate {
        layout,
        key,
        amount: pending.amount.to_string(),
        amount_paise: pending.amount.to_paise(),
        currency: CURRENCY,
        merchant: MERCHANT_NAME,
        description: PAYMENT_DESCRIPTION,
        order_code: pending.order_id.short_code(),
        prefill_name: if pending.prefill_name.is_empty() {
            shopper.user.full_name.clone().unwrap_or_default()
        } else {
            pending.prefill_name
        },
        prefill_email: shopper.user.email.clone().unwrap_or_default(),
        prefill_contact: pending.prefill_contact,
        theme: THEME_COLOR,
        gateway_unavailable: GATEWAY_UNAVAILABLE,
    }
    .into_response())
}

/// Record a successful payment posted back by the widget.
#[instrument(skip(state, session, shopper, callback), fields(payment_id = %callback.razorpay_payment_id))]
pub async fn razorpay_callback(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
    Form(callback): Form<GatewayCallback>,
) -> Result<Response> {
    let Some(pending) = take_pending_payment(&session).await? else {
        tracing::warn!("Gateway callback without a pending payment");
        return Ok(Redirect::to("/orders").into_response());
    };

    let transaction =
        deposit_transaction(&callback, pending.amount, Utc::now(), payment_reference());
    let recorded = state
        .api()
        .record_deposit_transaction(&pending.deposit_id, &transaction, Some(&shopper.token))
        .await;

    finish_order(&state, &session, &shopper.token).await?;
    match recorded {
        Ok(()) => {
            tracing::info!(order_id = %pending.order_id, "Payment recorded");
            Flash::success(&session, PAYMENT_SUCCESS).await?;
        }
        Err(e) => {
            tracing::error!(error = %e, order_id = %pending.order_id, "Failed to record payment");
            Flash::error(&session, PAYMENT_RECORD_FAILED).await?;
        }
    }
    Ok(Redirect::to(&order_path(&pending.order_id)).into_response())
}

/// The shopper closed the widget without paying.
#[instrument(skip(session, _shopper))]
pub async fn razorpay_cancel(
    session: Session,
    RequireAuth(_shopper): RequireAuth,
) -> Result<Response> {
    take_pending_payment(&session).await?;
    Flash::info(&session, PAYMENT_CANCELLED).await?;
    Ok(Redirect::to("/cart").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::FlashKind;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    #[test]
    fn test_order_path_encodes_id() {
        assert_eq!(order_path(&OrderId::new("665a/1")), "/orders/665a%2F1");
    }

    #[tokio::test]
    async fn test_cod_without_deposit_tells_shopper() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        cod_placed(&session, true).await.unwrap();
        let shown = Flash::take(&session).await;
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].message, COD_PLACED);

        cod_placed(&session, false).await.unwrap();
        let shown = Flash::take(&session).await;
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].kind, FlashKind::Success);
        assert_eq!(shown[1].kind, FlashKind::Info);
        assert_eq!(shown[1].message, COD_DEPOSIT_FAILED);
    }
}
