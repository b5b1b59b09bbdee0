//! Wishlist page, badge and "move to bag".

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use macstorm_core::ProductId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::cards::{ProductCard, cards};
use super::feedback::{CART_UPDATED, Reply, WISHLIST_UPDATED};
use super::layout::{BadgeTemplate, Layout};
use super::products::SELECT_SIZE;
use crate::api::ApiError;
use crate::api::types::AddToCart;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::Badges;
use crate::state::AppState;

pub const ADDED: &str = "Added to wishlist";
pub const REMOVED: &str = "Removed from wishlist";
pub const UPDATE_FAILED: &str = "Failed to update wishlist";
pub const REMOVE_FAILED: &str = "Failed to remove from wishlist";
pub const NETWORK_ERROR: &str = "Network error. Please check your connection.";

const WISHLIST_PATH: &str = "/wishlist";

/// Toast for a failed "move to bag": the backend's own message, or a
/// network hint when it never answered.
#[must_use]
pub fn move_failure(err: &ApiError) -> String {
    if err.is_transport() {
        NETWORK_ERROR.to_string()
    } else {
        err.user_message(super::cart::ADD_FAILED)
    }
}

#[must_use]
pub fn moved_message(size_label: &str) -> String {
    format!("Added to Bag! Size: {size_label}")
}

fn product_path(id: &ProductId) -> String {
    format!("/product/{}", urlencoding::encode(id.as_str()))
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/wishlist.html")]
pub struct WishlistTemplate {
    pub layout: Layout,
    /// `None` when the wishlist failed to load.
    pub products: Option<Vec<ProductCard>>,
}

/// Display the wishlist.
#[instrument(skip(state, session, shopper))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(shopper): RequireAuth,
) -> impl IntoResponse {
    let (layout, wishlist) = tokio::join!(
        Layout::load(&state, &session),
        state.api().wishlist(Some(&shopper.token))
    );

    let products = match wishlist {
        Ok(wishlist) => {
            if let Err(e) = Badges::set_wishlist(&session, wishlist.products.len()).await {
                tracing::warn!(error = %e, "Failed to cache wishlist badge");
            }
            Some(cards(&wishlist.products))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load wishlist");
            None
        }
    };

    WishlistTemplate { layout, products }
}

/// Wishlist badge fragment (HTMX).
#[instrument(skip(state, session, auth))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    auth: OptionalAuth,
) -> impl IntoResponse {
    let count = match auth.token() {
        Some(token) => match state.api().wishlist(Some(token)).await {
            Ok(wishlist) => {
                let count = wishlist.products.len();
                if let Err(e) = Badges::set_wishlist(&session, count).await {
                    tracing::warn!(error = %e, "Failed to cache wishlist badge");
                }
                count
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh wishlist badge");
                Badges::load(&session).await.wishlist
            }
        },
        None => 0,
    };

    BadgeTemplate {
        count,
        endpoint: "/wishlist/count",
        event: WISHLIST_UPDATED,
    }
}

#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: String,
}

/// Remove a product from the wishlist page.
#[instrument(skip(state, session, headers, shopper))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(shopper): RequireAuth,
    Form(form): Form<WishlistForm>,
) -> Response {
    let id = ProductId::new(form.product_id);
    match state
        .api()
        .remove_from_wishlist(&id, Some(&shopper.token))
        .await
    {
        Ok(()) => Reply::success(REMOVED, WISHLIST_PATH).trigger(WISHLIST_UPDATED),
        Err(e) => {
            tracing::error!(error = %e, product_id = %id, "Failed to remove from wishlist");
            Reply::error(e.user_message(REMOVE_FAILED), WISHLIST_PATH)
        }
    }
    .send(&session, &headers)
    .await
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: String,
    /// State the product page was rendered with.
    #[serde(default)]
    pub wishlisted: bool,
}

/// Add or remove from the product page.
#[instrument(skip(state, session, headers, shopper))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(shopper): RequireAuth,
    Form(form): Form<ToggleForm>,
) -> Response {
    let id = ProductId::new(form.product_id);
    let back = product_path(&id);
    let token = Some(&shopper.token);

    let (result, message) = if form.wishlisted {
        (state.api().remove_from_wishlist(&id, token).await, REMOVED)
    } else {
        (state.api().add_to_wishlist(&id, token).await, ADDED)
    };

    match result {
        Ok(()) => Reply::success(message, back).trigger(WISHLIST_UPDATED),
        Err(e) => {
            tracing::error!(error = %e, product_id = %id, "Failed to toggle wishlist");
            Reply::error(e.user_message(UPDATE_FAILED), back)
        }
    }
    .send(&session, &headers)
    .await
}

#[derive(Debug, Deserialize)]
pub struct MoveToBagForm {
    pub product_id: String,
    #[serde(default)]
    pub size: Option<String>,
}

/// Add one unit in the chosen size to the bag, then drop it from the
/// wishlist.
#[instrument(skip(state, session, headers, shopper))]
pub async fn move_to_bag(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(shopper): RequireAuth,
    Form(form): Form<MoveToBagForm>,
) -> Response {
    let id = ProductId::new(form.product_id);
    let token = Some(&shopper.token);

    let Some(code) = form.size.filter(|s| !s.trim().is_empty()) else {
        return Reply::error(SELECT_SIZE, WISHLIST_PATH)
            .send(&session, &headers)
            .await;
    };

    let product = match state.api().product(&id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::error!(error = %e, product_id = %id, "Failed to load product for bag");
            return Reply::error(move_failure(&e), WISHLIST_PATH)
                .send(&session, &headers)
                .await;
        }
    };
    let size_label = product
        .size(&code)
        .map_or_else(|| code.clone(), |s| s.label().to_owned());

    let input = AddToCart {
        product_id: id.clone(),
        size: code,
        size_label: size_label.clone(),
        quantity: 1,
    };
    if let Err(e) = state.api().add_to_cart(&input, token).await {
        tracing::error!(error = %e, product_id = %id, "Failed to move to bag");
        return Reply::error(move_failure(&e), WISHLIST_PATH)
            .send(&session, &headers)
            .await;
    }

    let removed = match state.api().remove_from_wishlist(&id, token).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, "Moved to bag but still wishlisted");
            false
        }
    };

    moved_reply(&size_label, removed)
        .send(&session, &headers)
        .await
}

/// Success answer for "move to bag". The wishlist badge refreshes only when
/// the product actually left the wishlist.
fn moved_reply(size_label: &str, removed_from_wishlist: bool) -> Reply {
    let reply = Reply::success(moved_message(size_label), WISHLIST_PATH).trigger(CART_UPDATED);
    if removed_from_wishlist {
        reply.trigger(WISHLIST_UPDATED)
    } else {
        reply
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiErrorBody;
    use axum::http::HeaderValue;
    use reqwest::StatusCode;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    #[test]
    fn test_move_failure_uses_backend_message() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            body: ApiErrorBody {
                message: Some("Only 2 left in stock".into()),
                error_type: None,
            },
        };
        assert_eq!(move_failure(&err), "Only 2 left in stock");

        let silent = ApiError::Rejected(ApiErrorBody::default());
        assert_eq!(move_failure(&silent), "Failed to add product to cart");
    }

    #[test]
    fn test_moved_message() {
        assert_eq!(moved_message("Medium"), "Added to Bag! Size: Medium");
    }

    #[tokio::test]
    async fn test_move_to_bag_refreshes_both_badges() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let mut headers = HeaderMap::new();
        headers.insert("hx-request", HeaderValue::from_static("true"));

        let response = moved_reply("Medium", true).send(&session, &headers).await;
        assert_eq!(
            response.headers().get("HX-Trigger").unwrap(),
            "cart-updated, wishlist-updated"
        );

        let response = moved_reply("Medium", false).send(&session, &headers).await;
        assert_eq!(response.headers().get("HX-Trigger").unwrap(), CART_UPDATED);
    }
}
