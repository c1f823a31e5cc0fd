//! User directory service.
//!
//! Registers users, checks passwords, and issues opaque bearer tokens. The
//! `user-info` endpoint is what every other service calls to turn a bearer
//! token into an [`common::Identity`].

pub mod accounts;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use service_kit::routes::observability_router;

pub use config::{AdminSeed, UserSettings};
pub use error::UserError;
pub use models::{
    AccessGrant, LoginRequest, ProfileUpdate, ProfileView, RefreshRequest, Registration,
    TokenPair, User,
};
pub use service::UserService;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8002;

/// Creates the user service router with all routes and shared state.
pub fn create_app(service: UserService, metrics_handle: PrometheusHandle) -> Router {
    let api = Router::new()
        .route("/api/users/register/", post(routes::register))
        .route(
            "/api/users/profile/",
            get(routes::get_profile).put(routes::update_profile),
        )
        .route("/api/auth/login/", post(routes::login))
        .route("/api/auth/refresh/", post(routes::refresh))
        .route("/api/auth/user-info/", get(routes::user_info))
        .with_state(service);

    service_kit::with_http_layers(api.merge(observability_router(metrics_handle)))
}
