//! Product directory service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use clients::{Availability, ClientError, ProductDirectory, ProductInfo, StockLevel};
use common::ProductId;
use tokio::sync::RwLock;

use crate::catalog::Catalog;
use crate::error::ProductError;
use crate::models::{
    Category, NewCategory, NewProduct, Product, ProductDetail, ProductFilter, ProductUpdate,
};

const SERVICE: &str = "product-service";

/// Catalog operations with tracing and metrics.
///
/// Cheap to clone; clones share one catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductService {
    catalog: Arc<RwLock<Catalog>>,
}

impl ProductService {
    /// Creates a service over an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_category(&self, new: NewCategory) -> Result<Category, ProductError> {
        let category = self.catalog.write().await.create_category(new, Utc::now())?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    pub async fn list_categories(&self, search: Option<&str>) -> Vec<Category> {
        self.catalog.read().await.categories(search)
    }

    pub async fn get_category(&self, slug: &str) -> Result<Category, ProductError> {
        self.catalog.read().await.category_by_slug(slug).cloned()
    }

    #[tracing::instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create_product(&self, new: NewProduct) -> Result<ProductDetail, ProductError> {
        let mut catalog = self.catalog.write().await;
        let product = catalog.create_product(new, Utc::now())?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(catalog.detail(&product))
    }

    /// Lists active products matching `filter`.
    pub async fn list_products(&self, filter: &ProductFilter) -> Vec<ProductDetail> {
        let catalog = self.catalog.read().await;
        catalog
            .list(filter)
            .iter()
            .map(|p| catalog.detail(p))
            .collect()
    }

    /// Looks up any product, active or not.
    pub async fn get_product(&self, product_id: ProductId) -> Result<ProductDetail, ProductError> {
        let catalog = self.catalog.read().await;
        let product = catalog.product(product_id)?;
        Ok(catalog.detail(product))
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        product_id: ProductId,
        update: ProductUpdate,
    ) -> Result<ProductDetail, ProductError> {
        let mut catalog = self.catalog.write().await;
        let product = catalog.update_product(product_id, update, Utc::now())?;
        tracing::info!("product updated");
        Ok(catalog.detail(&product))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, product_id: ProductId) -> Result<Product, ProductError> {
        let product = self.catalog.write().await.delete_product(product_id)?;
        tracing::info!("product deleted");
        Ok(product)
    }

    /// Atomically takes `quantity` units out of stock.
    #[tracing::instrument(skip(self))]
    pub async fn reserve(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<StockLevel, ProductError> {
        let result = self
            .catalog
            .write()
            .await
            .reserve(product_id, quantity, Utc::now());

        match result {
            Ok(stock_quantity) => {
                metrics::counter!("stock_reservations_total", "outcome" => "reserved")
                    .increment(1);
                tracing::info!(stock_quantity, "stock reserved");
                Ok(StockLevel {
                    product_id,
                    stock_quantity,
                })
            }
            Err(e) => {
                metrics::counter!("stock_reservations_total", "outcome" => "rejected")
                    .increment(1);
                tracing::warn!(error = %e, "reservation rejected");
                Err(e)
            }
        }
    }

    /// Puts `quantity` units back into stock.
    #[tracing::instrument(skip(self))]
    pub async fn release(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<StockLevel, ProductError> {
        let stock_quantity = self
            .catalog
            .write()
            .await
            .release(product_id, quantity, Utc::now())?;

        metrics::counter!("stock_releases_total").increment(1);
        tracing::info!(stock_quantity, "stock released");
        Ok(StockLevel {
            product_id,
            stock_quantity,
        })
    }

    /// Reports whether `quantity` units are currently in stock.
    pub async fn check_availability(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Availability, ProductError> {
        let catalog = self.catalog.read().await;
        let product = catalog.product(product_id)?;
        Ok(Availability {
            product_id,
            name: product.name.clone(),
            price: product.price,
            available: product.stock_quantity >= quantity,
            stock_quantity: product.stock_quantity,
            requested_quantity: quantity,
        })
    }
}

fn rejected(err: ProductError) -> ClientError {
    let status = if err.is_not_found() { 404 } else { 400 };
    ClientError::Rejected {
        service: SERVICE,
        status,
        detail: err.to_string(),
    }
}

/// Lets the cart and order services call the directory in-process.
#[async_trait]
impl ProductDirectory for ProductService {
    async fn get_product(&self, product_id: ProductId) -> Result<Option<ProductInfo>, ClientError> {
        match ProductService::get_product(self, product_id).await {
            Ok(detail) => {
                let p = detail.product;
                Ok(Some(ProductInfo {
                    id: p.id,
                    name: p.name,
                    price: p.price,
                    stock_quantity: p.stock_quantity,
                    is_active: p.is_active,
                    image_url: p.image_url,
                }))
            }
            Err(ProductError::NotFound { .. }) => Ok(None),
            Err(e) => Err(rejected(e)),
        }
    }

    async fn check_availability(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Option<Availability>, ClientError> {
        match ProductService::check_availability(self, product_id, quantity).await {
            Ok(availability) => Ok(Some(availability)),
            Err(ProductError::NotFound { .. }) => Ok(None),
            Err(e) => Err(rejected(e)),
        }
    }

    async fn reserve(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<StockLevel, ClientError> {
        ProductService::reserve(self, product_id, quantity)
            .await
            .map_err(rejected)
    }

    async fn release(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<StockLevel, ClientError> {
        ProductService::release(self, product_id, quantity)
            .await
            .map_err(rejected)
    }
}

#[cfg(test)]
mod tests {
    use common::{CategoryId, Money};

    use super::*;

    async fn seeded(stock: u32) -> (ProductService, ProductId) {
        let service = ProductService::new();
        let category = service
            .create_category(NewCategory {
                name: "Tools".to_string(),
                slug: None,
                description: String::new(),
            })
            .await
            .unwrap();
        let product = service
            .create_product(NewProduct {
                name: "Hammer".to_string(),
                description: String::new(),
                price: Money::from_cents(1000),
                category: category.id,
                stock_quantity: stock,
                image_url: String::new(),
                is_active: true,
            })
            .await
            .unwrap();
        (service, product.product.id)
    }

    #[tokio::test]
    async fn concurrent_reservations_never_oversell() {
        let (service, id) = seeded(10).await;

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.reserve(id, 1).await.is_ok() })
            })
            .collect();

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }

        assert_eq!(granted, 10);
        let detail = service.get_product(id).await.unwrap();
        assert_eq!(detail.product.stock_quantity, 0);
        assert!(!detail.is_in_stock);
    }

    #[tokio::test]
    async fn availability_reports_requested_quantity() {
        let (service, id) = seeded(3).await;
        let availability = service.check_availability(id, 5).await.unwrap();
        assert!(!availability.available);
        assert_eq!(availability.stock_quantity, 3);
        assert_eq!(availability.requested_quantity, 5);
    }

    #[tokio::test]
    async fn directory_maps_missing_products_to_none() {
        let (service, id) = seeded(3).await;
        let directory: &dyn ProductDirectory = &service;

        let info = directory.get_product(id).await.unwrap().unwrap();
        assert_eq!(info.name, "Hammer");
        assert!(directory.get_product(ProductId::new(42)).await.unwrap().is_none());
        assert!(
            directory
                .check_availability(ProductId::new(42), 1)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn directory_reserve_failures_are_rejections() {
        let (service, id) = seeded(1).await;
        let directory: &dyn ProductDirectory = &service;

        let err = directory.reserve(id, 2).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.detail(), "Insufficient stock quantity.");

        let err = directory.reserve(ProductId::new(9), 1).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn unknown_category_is_rejected() {
        let service = ProductService::new();
        let err = service
            .create_product(NewProduct {
                name: "Orphan".to_string(),
                description: String::new(),
                price: Money::from_cents(100),
                category: CategoryId::new(7),
                stock_quantity: 1,
                image_url: String::new(),
                is_active: true,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProductError::UnknownCategory {
                category_id: CategoryId::new(7)
            }
        );
    }
}
