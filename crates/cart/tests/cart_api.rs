//! Integration tests for the cart API.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use cart::{AppState, CartService};
use clients::{InMemoryProductDirectory, InMemoryUserDirectory, ProductInfo};
use common::{AccessToken, Identity, Money, ProductId, UserId};
use serde_json::{Value, json};
use service_kit::telemetry::standalone_metrics_handle;
use tower::ServiceExt;

const ALICE: &str = "alice-token";
const BOB: &str = "bob-token";

fn identity(id: i64, name: &str) -> Identity {
    Identity {
        user_id: UserId::new(id),
        email: format!("{name}@example.com"),
        username: name.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        is_staff: false,
    }
}

fn setup() -> (Router, InMemoryProductDirectory) {
    let products = InMemoryProductDirectory::new();
    products.insert(ProductInfo {
        id: ProductId::new(1),
        name: "Widget".to_string(),
        price: Money::from_cents(1000),
        stock_quantity: 5,
        is_active: true,
        image_url: "https://img.example.com/widget.png".to_string(),
    });

    let users = InMemoryUserDirectory::new();
    users.insert(&AccessToken::new(ALICE), identity(1, "alice"));
    users.insert(&AccessToken::new(BOB), identity(2, "bob"));

    let state = AppState {
        cart: CartService::new(Arc::new(products.clone())),
        users: Arc::new(users),
    };
    (
        cart::create_app(state, standalone_metrics_handle()),
        products,
    )
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let (app, _) = setup();
    let (status, json) = send(&app, "GET", "/api/cart/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["detail"], "Authentication credentials were not provided.");

    let (status, _) = send(&app, "GET", "/api/cart/", Some("stranger"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_cart_creates_empty_cart() {
    let (app, _) = setup();
    let (status, json) = send(&app, "GET", "/api/cart/", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user_id"], 1);
    assert_eq!(json["total_amount"], "0.00");
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_item_and_merge() {
    let (app, _) = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/api/cart/add/",
        Some(ALICE),
        Some(json!({ "product_id": 1, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Product added to cart successfully.");
    assert_eq!(json["cart_item"]["subtotal"], "20.00");

    let (status, json) = send(
        &app,
        "POST",
        "/api/cart/add/",
        Some(ALICE),
        Some(json!({ "product_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["cart_item"]["quantity"], 3);

    let (_, json) = send(&app, "GET", "/api/cart/", Some(ALICE), None).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["total_items"], 3);
    assert_eq!(json["total_amount"], "30.00");
    assert_eq!(json["items"][0]["product_info"]["current_price"], "10.00");
}

#[tokio::test]
async fn test_add_rejects_unavailable_and_unknown_products() {
    let (app, _) = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/api/cart/add/",
        Some(ALICE),
        Some(json!({ "product_id": 1, "quantity": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Product not available in requested quantity.");

    let (status, _) = send(
        &app,
        "POST",
        "/api/cart/add/",
        Some(ALICE),
        Some(json!({ "product_id": 42, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unreachable_product_directory_is_bad_gateway() {
    let (app, products) = setup();
    products.set_unreachable(true);

    let (status, _) = send(
        &app,
        "POST",
        "/api/cart/add/",
        Some(ALICE),
        Some(json!({ "product_id": 1, "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_update_and_remove_are_owner_scoped() {
    let (app, _) = setup();
    let (_, json) = send(
        &app,
        "POST",
        "/api/cart/add/",
        Some(ALICE),
        Some(json!({ "product_id": 1, "quantity": 1 })),
    )
    .await;
    let item_id = json["cart_item"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/cart/items/{item_id}/"),
        Some(BOB),
        Some(json!({ "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/cart/items/{item_id}/"),
        Some(ALICE),
        Some(json!({ "quantity": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cart_item"]["quantity"], 4);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/cart/items/{item_id}/remove/"),
        Some(BOB),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(
        &app,
        "DELETE",
        &format!("/api/cart/items/{item_id}/remove/"),
        Some(ALICE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Cart item deleted successfully.");
}

#[tokio::test]
async fn test_clear_and_summary() {
    let (app, _) = setup();

    let (status, json) = send(&app, "GET", "/api/cart/summary/", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_items"], 0);
    assert_eq!(json["total_amount"], "0.00");

    let (status, _) = send(&app, "DELETE", "/api/cart/clear/", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(
        &app,
        "POST",
        "/api/cart/add/",
        Some(ALICE),
        Some(json!({ "product_id": 1, "quantity": 2 })),
    )
    .await;
    let (_, json) = send(&app, "GET", "/api/cart/summary/", Some(ALICE), None).await;
    assert_eq!(json["total_items"], 2);
    assert_eq!(json["items_count"], 1);
    assert_eq!(json["total_amount"], "20.00");

    let (status, _) = send(&app, "DELETE", "/api/cart/clear/", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = send(&app, "GET", "/api/cart/summary/", Some(ALICE), None).await;
    assert_eq!(json["total_items"], 0);
}
