//! Order service entry point.

use std::sync::Arc;

use clients::{HttpCartGateway, HttpProductDirectory, HttpUserDirectory, build_http_client};
use event_bus::InMemoryEventBus;
use order::{
    AppState, DEFAULT_PORT, InMemoryOrderRepository, OrderSagaCoordinator, OrderSettings,
};
use service_kit::{Config, StartupError, telemetry};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = Config::from_env(DEFAULT_PORT);
    let settings = OrderSettings::from_env();
    telemetry::init_tracing(&config)?;
    let metrics_handle = telemetry::install_metrics_recorder()?;

    let http = build_http_client(config.upstream.timeout)?;
    let carts = HttpCartGateway::new(config.upstream.cart(), http.clone());
    let products = HttpProductDirectory::new(config.upstream.product(), http.clone());
    let users: Arc<HttpUserDirectory> =
        Arc::new(HttpUserDirectory::new(config.upstream.user(), http));
    let events = InMemoryEventBus::new(settings.event_bus_capacity);

    let coordinator = OrderSagaCoordinator::new(
        Arc::new(carts),
        users.clone(),
        Arc::new(products),
        Arc::new(InMemoryOrderRepository::new()),
        Arc::new(events),
    );
    let state = AppState {
        orders: coordinator,
        users,
    };
    let app = order::create_app(state, metrics_handle);

    tracing::info!(
        addr = %config.addr(),
        product_service = %config.upstream.product_url,
        cart_service = %config.upstream.cart_url,
        user_service = %config.upstream.user_url,
        event_bus_capacity = settings.event_bus_capacity,
        "starting order service"
    );
    service_kit::serve(app, &config.addr()).await
}
