//! Service configuration loaded from environment variables.

use std::time::Duration;

use clients::HttpClientConfig;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Where the sibling services live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    pub product_url: String,
    pub cart_url: String,
    pub user_url: String,
    /// Deadline applied to every downstream call.
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn product(&self) -> HttpClientConfig {
        HttpClientConfig::new(&self.product_url, self.timeout)
    }

    pub fn cart(&self) -> HttpClientConfig {
        HttpClientConfig::new(&self.cart_url, self.timeout)
    }

    pub fn user(&self) -> HttpClientConfig {
        HttpClientConfig::new(&self.user_url, self.timeout)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            product_url: "http://localhost:8001".to_string(),
            user_url: "http://localhost:8002".to_string(),
            cart_url: "http://localhost:8003".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: per service)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `PRODUCT_SERVICE_URL`, `CART_SERVICE_URL`, `USER_SERVICE_URL`
/// - `HTTP_TIMEOUT_SECS`: downstream call deadline (default: `5`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env(default_port: u16) -> Self {
        Self::from_lookup(default_port, |key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(default_port: u16, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = UpstreamConfig::default();
        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(default_port),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
            upstream: UpstreamConfig {
                product_url: lookup("PRODUCT_SERVICE_URL").unwrap_or(defaults.product_url),
                cart_url: lookup("CART_SERVICE_URL").unwrap_or(defaults.cart_url),
                user_url: lookup("USER_SERVICE_URL").unwrap_or(defaults.user_url),
                timeout: lookup("HTTP_TIMEOUT_SECS")
                    .and_then(|t| t.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
