//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Home page
//! GET  /products/{section}/{category}      - Listing from a home tile
//! GET  /{gender}/{category}/{subcategory}  - Listing from the menu
//! GET  /product/{id}                       - Product detail (?size=)
//! GET  /product/{id}/delivery              - Pincode check fragment (HTMX)
//!
//! # Search
//! GET  /search                     - Results page
//! GET  /search/suggest             - Autocomplete fragment (HTMX, rate limited)
//! POST /search/recent/clear        - Forget recent searches
//!
//! # Bag (requires auth)
//! GET  /cart                       - Bag page (?address=)
//! GET  /cart/count                 - Badge fragment (HTMX)
//! POST /cart/add                   - Add a size (HTMX or form)
//! POST /cart/update                - Change quantity
//! POST /cart/remove                - Remove a line
//! POST /cart/clear                 - Empty the bag
//! POST /cart/coupon                - Apply a coupon
//! POST /cart/coupon/remove         - Remove the coupon
//!
//! # Checkout (requires auth)
//! POST /checkout                   - Place the order
//! GET  /checkout/razorpay          - Gateway handoff page
//! POST /checkout/razorpay/callback - Record a completed payment
//! GET  /checkout/razorpay/cancel   - Shopper closed the gateway
//!
//! # Wishlist (requires auth)
//! GET  /wishlist                   - Wishlist page
//! GET  /wishlist/count             - Badge fragment (HTMX)
//! POST /wishlist/remove            - Remove a product
//! POST /wishlist/toggle            - Add or remove from a product page
//! POST /wishlist/move-to-bag       - Move to bag in a size
//!
//! # Orders (requires auth)
//! GET  /orders                              - Order history
//! GET  /orders/{id}                         - Order detail
//! POST /orders/{id}/items/{item_id}/cancel  - Request item cancellation
//! POST /orders/{id}/review                  - Review a delivered item (multipart)
//!
//! # Addresses (requires auth)
//! GET  /address-management                  - List and form (?edit=, ?state=)
//! POST /address-management                  - Create
//! GET  /address-management/cities           - City options fragment (HTMX)
//! POST /address-management/{id}             - Update
//! POST /address-management/{id}/delete      - Delete
//! POST /address-management/{id}/default     - Set default
//!
//! # Auth (posts rate limited)
//! GET  /login                      - Login and sign-up (?mode=register)
//! POST /login                      - Login action
//! GET  /register                   - Redirect to the sign-up mode
//! POST /register                   - Sign-up action
//! POST /logout                     - Logout action
//! GET  /forgot-password            - Request a reset link
//! POST /forgot-password            - Send or resend the link
//! GET  /reset-password             - Set a new password (?token=&email=)
//! POST /reset-password             - Reset action
//!
//! # Content
//! GET  /contact-us                 - Contact form
//! POST /contact-us                 - Submit an inquiry
//! GET  /about-us, /return-policy, /termsandconditions, /privacy-policy
//! ```

pub mod addresses;
pub mod auth;
pub mod cards;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod feedback;
pub mod home;
pub mod layout;
pub mod listing;
pub mod orders;
pub mod pages;
pub mod products;
pub mod search;
pub mod wishlist;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, suggest_rate_limiter};
use crate::state::AppState;

/// Review uploads carry up to five images.
const REVIEW_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Create the auth routes router.
///
/// The rate limiter only wraps the posts; the pages stay unthrottled.
pub fn auth_routes() -> Router<AppState> {
    let actions = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", get(auth::forgot_password_page))
        .route("/reset-password", get(auth::reset_password_page))
        .merge(actions)
}

/// Create the search routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search::results))
        .route(
            "/suggest",
            get(search::suggest).layer(suggest_rate_limiter()),
        )
        .route("/recent/clear", post(search::clear_recent))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/coupon", post(cart::apply_coupon))
        .route("/coupon/remove", post(cart::remove_coupon))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::place_order))
        .route("/razorpay", get(checkout::razorpay))
        .route("/razorpay/callback", post(checkout::razorpay_callback))
        .route("/razorpay/cancel", get(checkout::razorpay_cancel))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/count", get(wishlist::count))
        .route("/remove", post(wishlist::remove))
        .route("/toggle", post(wishlist::toggle))
        .route("/move-to-bag", post(wishlist::move_to_bag))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/items/{item_id}/cancel", post(orders::cancel_item))
        .route(
            "/{id}/review",
            post(orders::submit_review).layer(DefaultBodyLimit::max(REVIEW_BODY_LIMIT)),
        )
}

/// Create the address management routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route("/cities", get(addresses::city_options))
        .route("/{id}", post(addresses::update))
        .route("/{id}/delete", post(addresses::delete))
        .route("/{id}/default", post(addresses::set_default))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .route("/products/{section}/{category}", get(listing::section))
        .route("/product/{id}", get(products::show))
        .route("/product/{id}/delivery", get(products::delivery))
        .nest("/search", search_routes())
        // Shopper
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/orders", order_routes())
        .nest("/address-management", address_routes())
        .merge(auth_routes())
        // Content
        .route("/contact-us", get(contact::show).post(contact::submit))
        .route("/about-us", get(pages::about))
        .route("/return-policy", get(pages::return_policy))
        .route("/termsandconditions", get(pages::terms))
        .route("/privacy-policy", get(pages::privacy))
        // Menu links; static segments above take precedence
        .route("/{gender}/{category}/{subcategory}", get(listing::navigation))
}
