//! Cart and wishlist endpoints.

use macstorm_core::{CartItemId, ProductId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::client::segment;
use super::types::{Ack, AddToCart, Cart, Wishlist};
use super::{ApiClient, ApiError, SessionToken};

#[derive(Deserialize)]
struct CartEnvelope {
    #[serde(default)]
    cart: Option<Cart>,
}

impl CartEnvelope {
    fn into_cart(self) -> Cart {
        self.cart.unwrap_or_default().without_missing_products()
    }
}

#[derive(Deserialize)]
struct WishlistEnvelope {
    #[serde(default)]
    wishlist: Option<Wishlist>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WishlistCheck {
    #[serde(default)]
    is_in_wishlist: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductRef<'a> {
    product_id: &'a str,
}

impl ApiClient {
    /// The shopper's cart, without lines whose product was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: Option<&SessionToken>) -> Result<Cart, ApiError> {
        let envelope: CartEnvelope = self.get("cart", token).await?;
        Ok(envelope.into_cart())
    }

    /// Add a product in one size to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, input), fields(product_id = %input.product_id, size = %input.size))]
    pub async fn add_to_cart(
        &self,
        input: &AddToCart,
        token: Option<&SessionToken>,
    ) -> Result<(), ApiError> {
        let _: Ack = self.post_json("cart/add", input, token).await?;
        Ok(())
    }

    /// Set the quantity of one cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(item_id = %id))]
    pub async fn update_cart_item(
        &self,
        id: &CartItemId,
        quantity: u32,
        token: Option<&SessionToken>,
    ) -> Result<Cart, ApiError> {
        let envelope: CartEnvelope = self
            .put_json(
                &format!("cart/update/{}", segment(id.as_str())),
                &json!({ "quantity": quantity }),
                token,
            )
            .await?;
        Ok(envelope.into_cart())
    }

    /// Remove one cart line. The backend names the field `productId`
    /// but expects the cart item id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(item_id = %id))]
    pub async fn remove_cart_item(
        &self,
        id: &CartItemId,
        token: Option<&SessionToken>,
    ) -> Result<Cart, ApiError> {
        let envelope: CartEnvelope = self
            .post_json(
                "cart/remove",
                &ProductRef {
                    product_id: id.as_str(),
                },
                token,
            )
            .await?;
        Ok(envelope.into_cart())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: Option<&SessionToken>) -> Result<Cart, ApiError> {
        let envelope: CartEnvelope = self.delete("cart/clear", token).await?;
        Ok(envelope.into_cart())
    }

    /// The shopper's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn wishlist(&self, token: Option<&SessionToken>) -> Result<Wishlist, ApiError> {
        let envelope: WishlistEnvelope = self.get("wishlist", token).await?;
        Ok(envelope.wishlist.unwrap_or_default())
    }

    /// Whether `id` is on the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn wishlist_contains(
        &self,
        id: &ProductId,
        token: Option<&SessionToken>,
    ) -> Result<bool, ApiError> {
        let check: WishlistCheck = self
            .get(&format!("wishlist/check/{}", segment(id.as_str())), token)
            .await?;
        Ok(check.is_in_wishlist)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn add_to_wishlist(
        &self,
        id: &ProductId,
        token: Option<&SessionToken>,
    ) -> Result<(), ApiError> {
        let body = ProductRef {
            product_id: id.as_str(),
        };
        let _: Ack = self.post_json("wishlist/add", &body, token).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn remove_from_wishlist(
        &self,
        id: &ProductId,
        token: Option<&SessionToken>,
    ) -> Result<(), ApiError> {
        let body = ProductRef {
            product_id: id.as_str(),
        };
        let _: Ack = self.post_json("wishlist/remove", &body, token).await?;
        Ok(())
    }
}
