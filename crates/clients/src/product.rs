//! Product directory contract and HTTP adapter.

use async_trait::async_trait;
use common::ProductId;
use reqwest::{Client, StatusCode};

use crate::error::ClientError;
use crate::http::{self, HttpClientConfig};
use crate::models::{Availability, ProductInfo, StockLevel};

const SERVICE: &str = "product-service";

/// Operations the cart and order services need from the product directory.
#[async_trait]
pub trait ProductDirectory: Send + Sync {
    /// Looks a product up by id. `Ok(None)` if it does not exist.
    async fn get_product(&self, product_id: ProductId) -> Result<Option<ProductInfo>, ClientError>;

    /// Checks whether `quantity` units are in stock. `Ok(None)` if the
    /// product does not exist.
    async fn check_availability(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Option<Availability>, ClientError>;

    /// Takes `quantity` units out of stock, or fails without mutation.
    async fn reserve(&self, product_id: ProductId, quantity: u32)
    -> Result<StockLevel, ClientError>;

    /// Puts `quantity` units back into stock.
    async fn release(&self, product_id: ProductId, quantity: u32)
    -> Result<StockLevel, ClientError>;
}

/// [`ProductDirectory`] over the product service's REST API.
#[derive(Debug, Clone)]
pub struct HttpProductDirectory {
    config: HttpClientConfig,
    http: Client,
}

impl HttpProductDirectory {
    /// Creates an adapter sharing `http` for connection pooling.
    pub fn new(config: HttpClientConfig, http: Client) -> Self {
        Self { config, http }
    }

    async fn adjust_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
        action: &str,
    ) -> Result<StockLevel, ClientError> {
        let url = self
            .config
            .url(&format!("/api/products/{product_id}/{action}/"));
        let request = self
            .http
            .post(url)
            .json(&serde_json::json!({ "quantity": quantity }));

        let response = http::send(SERVICE, request).await?;
        if !response.status().is_success() {
            return Err(http::rejection(SERVICE, response).await);
        }
        http::decode(SERVICE, response).await
    }
}

#[async_trait]
impl ProductDirectory for HttpProductDirectory {
    #[tracing::instrument(skip(self))]
    async fn get_product(&self, product_id: ProductId) -> Result<Option<ProductInfo>, ClientError> {
        let url = self.config.url(&format!("/api/products/{product_id}/"));
        let response = http::send(SERVICE, self.http.get(url)).await?;

        match response.status() {
            StatusCode::OK => http::decode(SERVICE, response).await.map(Some),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(http::rejection(SERVICE, response).await),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn check_availability(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Option<Availability>, ClientError> {
        let url = self
            .config
            .url(&format!("/api/products/{product_id}/check-availability/"));
        let request = self.http.get(url).query(&[("quantity", quantity)]);
        let response = http::send(SERVICE, request).await?;

        match response.status() {
            StatusCode::OK => http::decode(SERVICE, response).await.map(Some),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(http::rejection(SERVICE, response).await),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn reserve(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<StockLevel, ClientError> {
        self.adjust_stock(product_id, quantity, "reserve").await
    }

    #[tracing::instrument(skip(self))]
    async fn release(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<StockLevel, ClientError> {
        self.adjust_stock(product_id, quantity, "release").await
    }
}
