//! User service entry point.

use service_kit::{Config, StartupError, telemetry};
use user::{DEFAULT_PORT, UserService, UserSettings};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = Config::from_env(DEFAULT_PORT);
    telemetry::init_tracing(&config)?;
    let metrics_handle = telemetry::install_metrics_recorder()?;

    let settings = UserSettings::from_env();
    let service = UserService::new(&settings);
    if let Some(admin) = &settings.admin {
        if let Err(e) = service.seed_admin(admin).await {
            tracing::error!(error = %e, "failed to seed staff account");
        }
    }

    let app = user::create_app(service, metrics_handle);

    tracing::info!(addr = %config.addr(), "starting user service");
    service_kit::serve(app, &config.addr()).await
}
