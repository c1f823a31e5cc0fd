//! Cart service entry point.

use std::sync::Arc;

use cart::{AppState, CartService, DEFAULT_PORT};
use clients::{HttpProductDirectory, HttpUserDirectory, build_http_client};
use service_kit::{Config, StartupError, telemetry};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = Config::from_env(DEFAULT_PORT);
    telemetry::init_tracing(&config)?;
    let metrics_handle = telemetry::install_metrics_recorder()?;

    let http = build_http_client(config.upstream.timeout)?;
    let products = HttpProductDirectory::new(config.upstream.product(), http.clone());
    let users = HttpUserDirectory::new(config.upstream.user(), http);

    let state = AppState {
        cart: CartService::new(Arc::new(products)),
        users: Arc::new(users),
    };
    let app = cart::create_app(state, metrics_handle);

    tracing::info!(
        addr = %config.addr(),
        product_service = %config.upstream.product_url,
        user_service = %config.upstream.user_url,
        "starting cart service"
    );
    service_kit::serve(app, &config.addr()).await
}
