//! Plumbing shared by every storefront service.
//!
//! Provides environment configuration, tracing and Prometheus set-up, the
//! `/health` and `/metrics` routes, the [`ApiError`] response type, the
//! [`Bearer`] token extractor, and a graceful-shutdown server loop.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod telemetry;

pub use auth::{Bearer, authenticate, authorize_request};
pub use config::{Config, LogFormat, UpstreamConfig};
pub use error::{ApiError, StartupError};
pub use server::{serve, shutdown_signal, with_http_layers};
