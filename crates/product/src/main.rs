//! Product service entry point.

use product::{DEFAULT_PORT, ProductService};
use service_kit::{Config, StartupError, telemetry};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = Config::from_env(DEFAULT_PORT);
    telemetry::init_tracing(&config)?;
    let metrics_handle = telemetry::install_metrics_recorder()?;

    let app = product::create_app(ProductService::new(), metrics_handle);

    tracing::info!(addr = %config.addr(), "starting product service");
    service_kit::serve(app, &config.addr()).await
}
