//! Tracing subscriber and Prometheus recorder installation.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, LogFormat};
use crate::error::StartupError;

/// Installs the global tracing subscriber.
///
/// The filter comes from `config.log_level`; an unparseable directive
/// falls back to `info`.
pub fn init_tracing(config: &Config) -> Result<(), StartupError> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
    }
    Ok(())
}

/// Installs the global Prometheus recorder and returns its render handle.
pub fn install_metrics_recorder() -> Result<PrometheusHandle, StartupError> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Returns a handle to a recorder that is not installed globally.
///
/// Used by tests that build several apps in one process.
pub fn standalone_metrics_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
