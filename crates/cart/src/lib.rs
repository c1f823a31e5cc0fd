//! Cart service.
//!
//! Keeps one cart per user. Lines snapshot the product's name and price
//! when first added; adding the same product again merges quantities.
//! Every write is checked against the product directory's availability.

pub mod error;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;

use axum::Router;
use axum::routing::{delete, get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use service_kit::routes::observability_router;

pub use error::CartError;
pub use models::{
    AddedItem, Cart, CartItem, CartItemView, CartSummary, CartView, ProductSummary,
};
pub use routes::AppState;
pub use service::CartService;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8003;

/// Creates the cart service router with all routes and shared state.
pub fn create_app(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let api = Router::new()
        .route("/api/cart/", get(routes::get_cart))
        .route("/api/cart/add/", post(routes::add_item))
        .route("/api/cart/items/{id}/", put(routes::update_item))
        .route("/api/cart/items/{id}/remove/", delete(routes::remove_item))
        .route("/api/cart/clear/", delete(routes::clear_cart))
        .route("/api/cart/summary/", get(routes::summary))
        .with_state(state);

    service_kit::with_http_layers(api.merge(observability_router(metrics_handle)))
}
