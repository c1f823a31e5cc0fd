//! Shared plumbing for the reqwest-backed adapters.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Where a downstream service lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL without trailing slash, e.g. `"http://localhost:8001"`.
    pub base_url: String,
    /// Deadline for one request, connect included.
    pub timeout: Duration,
}

impl HttpClientConfig {
    /// Creates a config, stripping any trailing slash from `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, timeout }
    }

    /// Joins a path (starting with `/`) onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Builds a client that applies `timeout` to every request.
pub fn build_http_client(timeout: Duration) -> Result<Client, ClientError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::Transport {
            service: "http-client",
            detail: e.to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    detail: String,
}

/// Sends a request, turning transport failures into [`ClientError::Transport`].
pub(crate) async fn send(
    service: &'static str,
    request: RequestBuilder,
) -> Result<Response, ClientError> {
    request.send().await.map_err(|e| {
        tracing::error!(service, error = %e, "downstream request failed");
        ClientError::Transport {
            service,
            detail: e.to_string(),
        }
    })
}

/// Decodes a successful JSON body.
pub(crate) async fn decode<T: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T, ClientError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::UnexpectedResponse {
            service,
            detail: e.to_string(),
        })
}

/// Converts a non-success response into [`ClientError::Rejected`].
///
/// The `detail` (or `error`) field of a JSON body is used as the reason
/// when present, otherwise the raw body text.
pub(crate) async fn rejection(service: &'static str, response: Response) -> ClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.detail)
        .unwrap_or(text);

    tracing::warn!(service, status, %detail, "downstream request rejected");
    ClientError::Rejected {
        service,
        status,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_strips_trailing_slash() {
        let config = HttpClientConfig::new("http://localhost:8001/", Duration::from_secs(5));
        assert_eq!(config.base_url, "http://localhost:8001");
        assert_eq!(
            config.url("/api/products/1/"),
            "http://localhost:8001/api/products/1/"
        );
    }

    #[test]
    fn client_builds_with_timeout() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }
}
