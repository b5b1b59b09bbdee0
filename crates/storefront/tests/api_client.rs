//! Integration tests for the commerce API client against a mock backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use macstorm_core::{AddressId, OrderId, ProductId};
use macstorm_storefront::api::{
    AddToCart, ApiClient, ApiError, Credentials, ErrorKind, SessionToken,
};
use macstorm_storefront::config::ApiConfig;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "header.payload.signature";

fn client_for(server: &MockServer) -> ApiClient {
    client_with_timeout(server, Duration::from_secs(5))
}

fn client_with_timeout(server: &MockServer, timeout: Duration) -> ApiClient {
    let config = ApiConfig::new(&format!("{}/api", server.uri()), timeout)
        .expect("mock server uri is a valid base url");
    ApiClient::new(&config).expect("client builds")
}

fn token() -> SessionToken {
    SessionToken::parse(TOKEN).expect("three segments")
}

// -----------------------------------------------------------------------------
// Cart
// -----------------------------------------------------------------------------

#[tokio::test]
async fn cart_drops_lines_whose_product_was_deleted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "cart": {
                "items": [
                    {
                        "_id": "line-1",
                        "product": { "_id": "p1", "productName": "Oxford Shirt", "price": 1299 },
                        "quantity": 2,
                        "size": "M"
                    },
                    { "_id": "line-2", "product": null, "quantity": 1, "size": "L" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cart = client_for(&server).cart(Some(&token())).await.unwrap();

    assert_eq!(cart.items.len(), 1);
    let item = &cart.items[0];
    assert_eq!(item.id.as_str(), "line-1");
    assert_eq!(item.quantity, 2);
    assert_eq!(item.size, "M");
    assert_eq!(
        item.product.as_ref().map(|p| p.product_name.as_str()),
        Some("Oxford Shirt")
    );
}

#[tokio::test]
async fn missing_cart_reads_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let cart = client_for(&server).cart(Some(&token())).await.unwrap();
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn add_to_cart_sends_camel_case_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_json(json!({
            "productId": "p1",
            "size": "M",
            "sizeLabel": "Medium",
            "quantity": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let input = AddToCart {
        product_id: ProductId::new("p1"),
        size: "M".into(),
        size_label: "Medium".into(),
        quantity: 1,
    };
    client_for(&server)
        .add_to_cart(&input, Some(&token()))
        .await
        .unwrap();
}

// -----------------------------------------------------------------------------
// Login
// -----------------------------------------------------------------------------

#[tokio::test]
async fn login_returns_token_and_profile() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "asha@example.com", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": TOKEN,
            "user": { "fullName": "Asha Rao", "email": "asha@example.com" }
        })))
        .mount(&server)
        .await;

    let credentials = Credentials {
        email: "asha@example.com".into(),
        password: "secret1".into(),
    };
    let response = client_for(&server).login(&credentials).await.unwrap();

    assert_eq!(response.token, TOKEN);
    assert_eq!(response.user.first_name(), "Asha");
    assert!(SessionToken::parse(&response.token).is_some());
}

// -----------------------------------------------------------------------------
// Error mapping
// -----------------------------------------------------------------------------

#[tokio::test]
async fn rejected_envelope_carries_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Cart is locked"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).cart(Some(&token())).await.unwrap_err();

    assert!(matches!(err, ApiError::Rejected(_)));
    assert_eq!(err.kind(), ErrorKind::Other);
    assert_eq!(err.user_message("fallback"), "Cart is locked");
}

#[tokio::test]
async fn missing_order_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Order not found" })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .order(&OrderId::new("missing"), Some(&token()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.user_message("fallback"), "Order not found");
    assert!(!err.is_transport());
}

#[tokio::test]
async fn unauthorized_without_body_uses_fallback_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).orders(None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.user_message("Please log in"), "Please log in");
}

#[tokio::test]
async fn coupon_rejection_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/coupon/apply"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "Coupon already used",
            "errorType": "COUPON_ALREADY_USED"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .apply_coupon("WELCOME10", Some(&token()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CouponAlreadyUsed);
}

#[tokio::test]
async fn slow_backend_maps_to_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "products": [] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let err = client_with_timeout(&server, Duration::from_millis(50))
        .products()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(err.is_transport());
}

// -----------------------------------------------------------------------------
// Navigation cache
// -----------------------------------------------------------------------------

#[tokio::test]
async fn navigation_is_fetched_once_then_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/navigation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "navigation": {
                "topLevel": [
                    { "id": 1, "name": "Men", "slug": "men", "categories": [] }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.navigation().await.unwrap();
    let second = client.navigation().await.unwrap();

    assert_eq!(first.top_level.len(), 1);
    assert_eq!(first.top_level[0].id, "1");
    assert_eq!(second.top_level[0].slug, "men");
}

// -----------------------------------------------------------------------------
// Addresses
// -----------------------------------------------------------------------------

#[tokio::test]
async fn addresses_skip_malformed_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/address"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "addresses": [
                {
                    "_id": "a1",
                    "fullName": "Asha Rao",
                    "mobileNumber": 9876543210_u64,
                    "houseNo": "12",
                    "street": "MG Road",
                    "city": "Bengaluru",
                    "isDefault": true
                },
                { "fullName": "no id" }
            ]
        })))
        .mount(&server)
        .await;

    let addresses = client_for(&server).addresses(Some(&token())).await.unwrap();

    assert_eq!(addresses.len(), 1);
    let address = &addresses[0];
    assert_eq!(address.id.as_str(), "a1");
    assert_eq!(address.mobile_number, "9876543210");
    assert_eq!(address.house_number, "12");
    assert!(address.is_default);
}

#[tokio::test]
async fn empty_body_counts_as_success() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/address/a1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .delete_address(&AddressId::new("a1"), Some(&token()))
        .await
        .unwrap();
}
