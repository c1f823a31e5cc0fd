//! Cart contract and HTTP adapter.

use async_trait::async_trait;
use common::{AccessToken, UserId};
use reqwest::{Client, StatusCode};

use crate::error::ClientError;
use crate::http::{self, HttpClientConfig};
use crate::models::CartSnapshot;

const SERVICE: &str = "cart-service";

/// Operations the order saga needs from the cart service.
///
/// Both the user id and the caller's token are passed: the HTTP adapter
/// propagates the token, in-process implementations key by user id.
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Reads the user's cart. `Ok(None)` if the user has none.
    async fn fetch_cart(
        &self,
        user_id: UserId,
        token: &AccessToken,
    ) -> Result<Option<CartSnapshot>, ClientError>;

    /// Empties the user's cart. Having no cart is not an error.
    async fn clear_cart(&self, user_id: UserId, token: &AccessToken) -> Result<(), ClientError>;
}

/// [`CartGateway`] over the cart service's REST API.
#[derive(Debug, Clone)]
pub struct HttpCartGateway {
    config: HttpClientConfig,
    http: Client,
}

impl HttpCartGateway {
    /// Creates an adapter sharing `http` for connection pooling.
    pub fn new(config: HttpClientConfig, http: Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl CartGateway for HttpCartGateway {
    #[tracing::instrument(skip(self, token))]
    async fn fetch_cart(
        &self,
        user_id: UserId,
        token: &AccessToken,
    ) -> Result<Option<CartSnapshot>, ClientError> {
        let request = self
            .http
            .get(self.config.url("/api/cart/"))
            .bearer_auth(token.as_str());
        let response = http::send(SERVICE, request).await?;

        let cart: CartSnapshot = match response.status() {
            StatusCode::OK => http::decode(SERVICE, response).await?,
            StatusCode::NOT_FOUND => return Ok(None),
            _ => return Err(http::rejection(SERVICE, response).await),
        };

        // The cart service resolves the owner from the token.
        if cart.user_id != user_id {
            return Err(ClientError::UnexpectedResponse {
                service: SERVICE,
                detail: format!("cart {} belongs to user {}", cart.id, cart.user_id),
            });
        }
        Ok(Some(cart))
    }

    #[tracing::instrument(skip(self, token))]
    async fn clear_cart(&self, user_id: UserId, token: &AccessToken) -> Result<(), ClientError> {
        let request = self
            .http
            .delete(self.config.url("/api/cart/clear/"))
            .bearer_auth(token.as_str());
        let response = http::send(SERVICE, request).await?;

        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(%user_id, "cart cleared");
            return Ok(());
        }
        Err(http::rejection(SERVICE, response).await)
    }
}
