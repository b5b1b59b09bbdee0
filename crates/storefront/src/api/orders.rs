//! Coupons, orders, cancellations and payment deposits.

use macstorm_core::{DepositId, OrderId, OrderItemId, PaymentMethod};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::client::segment;
use super::de;
use super::types::{
    Ack, CancellationRequest, Coupon, CouponApplication, CreateDeposit, CreateOrder, Deposit,
    DepositTransaction, Order,
};
use super::{ApiClient, ApiError, SessionToken};

#[derive(Deserialize)]
struct CouponsEnvelope {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    coupons: Vec<Coupon>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyCoupon<'a> {
    coupon_code: &'a str,
}

#[derive(Deserialize)]
struct OrderEnvelope {
    order: Order,
}

#[derive(Deserialize)]
struct OrdersEnvelope {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    orders: Vec<Order>,
}

#[derive(Deserialize)]
struct DepositEnvelope {
    deposit: Deposit,
}

impl ApiClient {
    // =========================================================================
    // Coupons
    // =========================================================================

    /// Coupons currently on offer.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn active_coupons(
        &self,
        token: Option<&SessionToken>,
    ) -> Result<Vec<Coupon>, ApiError> {
        let envelope: CouponsEnvelope = self.get("coupon/active", token).await?;
        Ok(envelope.coupons)
    }

    /// Validate a coupon against the current cart and get its discount.
    ///
    /// # Errors
    ///
    /// Returns an error if the coupon is not applicable or the request fails.
    #[instrument(skip(self, token))]
    pub async fn apply_coupon(
        &self,
        code: &str,
        token: Option<&SessionToken>,
    ) -> Result<CouponApplication, ApiError> {
        self.post_json("coupon/apply", &ApplyCoupon { coupon_code: code }, token)
            .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order or the request fails.
    #[instrument(skip(self, token, draft), fields(lines = draft.items.len(), coupon = draft.coupon_code.is_some()))]
    pub async fn create_order(
        &self,
        draft: &CreateOrder,
        token: Option<&SessionToken>,
    ) -> Result<Order, ApiError> {
        let envelope: OrderEnvelope = self.post_json("orders/create", draft, token).await?;
        Ok(envelope.order)
    }

    /// The shopper's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn orders(&self, token: Option<&SessionToken>) -> Result<Vec<Order>, ApiError> {
        let envelope: OrdersEnvelope = self.get("orders/user", token).await?;
        Ok(envelope.orders)
    }

    /// # Errors
    ///
    /// Returns an error if the order does not exist or the request fails.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn order(
        &self,
        id: &OrderId,
        token: Option<&SessionToken>,
    ) -> Result<Order, ApiError> {
        let envelope: OrderEnvelope = self
            .get(&format!("orders/{}", segment(id.as_str())), token)
            .await?;
        Ok(envelope.order)
    }

    /// Ask for one order item to be cancelled. An admin approves or rejects it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, request), fields(order_id = %order, item_id = %item))]
    pub async fn request_cancellation(
        &self,
        order: &OrderId,
        item: &OrderItemId,
        request: &CancellationRequest,
        token: Option<&SessionToken>,
    ) -> Result<(), ApiError> {
        let path = format!(
            "cancel/{}/items/{}/request",
            segment(order.as_str()),
            segment(item.as_str())
        );
        let _: Ack = self.post_json(&path, request, token).await?;
        Ok(())
    }

    // =========================================================================
    // Deposits
    // =========================================================================

    /// Open a payment record for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(order_id = %order))]
    pub async fn create_deposit(
        &self,
        order: &OrderId,
        method: PaymentMethod,
        token: Option<&SessionToken>,
    ) -> Result<DepositId, ApiError> {
        let body = CreateDeposit {
            order_id: order.clone(),
            payment_method: method.deposit_method(),
        };
        let envelope: DepositEnvelope = self.post_json("deposit", &body, token).await?;
        Ok(envelope.deposit.id)
    }

    /// Attach the gateway's transaction details to a deposit.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, transaction), fields(deposit_id = %id))]
    pub async fn record_deposit_transaction(
        &self,
        id: &DepositId,
        transaction: &DepositTransaction,
        token: Option<&SessionToken>,
    ) -> Result<(), ApiError> {
        let path = format!("deposit/{}/transaction", segment(id.as_str()));
        let _: Ack = self.put_json(&path, transaction, token).await?;
        Ok(())
    }
}
