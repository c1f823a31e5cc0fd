//! Order service.
//!
//! Turns a user's cart into an order through a checkout saga: read the
//! cart, resolve the user, reserve stock line by line, persist, publish
//! `order.created`. Reservations are released if a later step fails.
//! Staff move orders through `pending → confirmed → shipped → delivered`,
//! or cancel them, which puts the stock back.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod models;
pub mod repository;
pub mod routes;
pub mod saga;
pub mod state;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use service_kit::routes::observability_router;

pub use config::OrderSettings;
pub use coordinator::OrderSagaCoordinator;
pub use error::OrderError;
pub use models::{
    CreateOrderRequest, CustomerInfo, Order, OrderItem, OrderStatistics, OrderView,
};
pub use repository::{InMemoryOrderRepository, OrderRepository, RepositoryError};
pub use routes::AppState;
pub use state::OrderStatus;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8004;

/// Creates the order service router with all routes and shared state.
pub fn create_app(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let api = Router::new()
        .route("/api/orders/", get(routes::list_orders))
        .route("/api/orders/create/", post(routes::create_order))
        .route("/api/orders/statistics/", get(routes::statistics))
        .route("/api/orders/{id}/", get(routes::get_order))
        .route("/api/orders/{id}/status/", put(routes::update_status))
        .with_state(state);

    service_kit::with_http_layers(api.merge(observability_router(metrics_handle)))
}
