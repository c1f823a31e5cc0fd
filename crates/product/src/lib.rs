//! Product directory service.
//!
//! Owns product and category records and the stock counters that the
//! order saga reserves against. Stock mutations are serialized by a single
//! write lock over the catalog, so a reservation either fully applies or
//! leaves stock untouched.

pub mod catalog;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use service_kit::routes::observability_router;

pub use error::ProductError;
pub use models::{
    Category, NewCategory, NewProduct, OrderingField, Product, ProductDetail, ProductFilter,
    ProductOrdering, ProductUpdate, slugify,
};
pub use service::ProductService;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8001;

/// Creates the product service router with all routes and shared state.
pub fn create_app(service: ProductService, metrics_handle: PrometheusHandle) -> Router {
    let api = Router::new()
        .route(
            "/api/products/",
            get(routes::list_products).post(routes::create_product),
        )
        .route(
            "/api/products/categories/",
            get(routes::list_categories).post(routes::create_category),
        )
        .route(
            "/api/products/categories/{slug}/",
            get(routes::get_category),
        )
        .route(
            "/api/products/{id}/",
            get(routes::get_product)
                .put(routes::replace_product)
                .patch(routes::patch_product)
                .delete(routes::delete_product),
        )
        .route("/api/products/{id}/reserve/", post(routes::reserve))
        .route("/api/products/{id}/release/", post(routes::release))
        .route(
            "/api/products/{id}/check-availability/",
            get(routes::check_availability),
        )
        .with_state(service);

    service_kit::with_http_layers(api.merge(observability_router(metrics_handle)))
}
