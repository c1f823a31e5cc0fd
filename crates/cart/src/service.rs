//! Cart service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use clients::{CartGateway, CartSnapshot, ClientError, ProductDirectory};
use common::{AccessToken, CartItemId, ProductId, UserId};
use tokio::sync::RwLock;

use crate::error::CartError;
use crate::models::{AddedItem, CartItem, CartItemView, CartSummary, CartView, ProductSummary};
use crate::store::CartStore;

/// Cart operations validated against the product directory.
///
/// Cheap to clone; clones share one store. The store lock is never held
/// across a call to the product directory.
#[derive(Clone)]
pub struct CartService {
    store: Arc<RwLock<CartStore>>,
    products: Arc<dyn ProductDirectory>,
}

/// Checks and writes retried when another add lands in between.
const MAX_ADD_ATTEMPTS: u32 = 3;

fn positive(quantity: i64) -> Result<u32, CartError> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or(CartError::InvalidQuantity)
}

impl CartService {
    pub fn new(products: Arc<dyn ProductDirectory>) -> Self {
        Self {
            store: Arc::new(RwLock::new(CartStore::new())),
            products,
        }
    }

    /// Asks the directory whether `quantity` units are in stock.
    ///
    /// An unreachable directory counts as "not available".
    async fn is_available(&self, product_id: ProductId, quantity: u32) -> bool {
        match self.products.check_availability(product_id, quantity).await {
            Ok(Some(availability)) => availability.available,
            Ok(None) => false,
            Err(e) => {
                tracing::error!(%product_id, error = %e, "availability check failed");
                false
            }
        }
    }

    /// Adds `quantity` units of a product, merging into an existing line.
    ///
    /// The merged total is checked for availability and written only if the
    /// line still holds the quantity that was checked.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<AddedItem, CartError> {
        let quantity = positive(quantity)?;

        let product = self
            .products
            .get_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;
        if !product.is_active {
            return Err(CartError::ProductInactive);
        }

        let mut attempt = 1;
        let (item, created) = loop {
            let existing = self.store.read().await.quantity_of(user_id, product_id);
            let merged = existing
                .unwrap_or(0)
                .checked_add(quantity)
                .ok_or(CartError::Unavailable)?;
            if !self.is_available(product_id, merged).await {
                tracing::warn!(merged, "product not available in requested quantity");
                return Err(CartError::Unavailable);
            }

            let written = self.store.write().await.add(
                user_id,
                product_id,
                &product.name,
                product.price,
                existing,
                quantity,
                Utc::now(),
            );
            match written {
                Err(CartError::QuantityChanged) if attempt < MAX_ADD_ATTEMPTS => {
                    tracing::debug!(attempt, "cart line changed during check, retrying");
                    attempt += 1;
                }
                result => break result?,
            }
        };

        metrics::counter!("cart_mutations_total", "op" => "add").increment(1);
        tracing::info!(item_id = %item.id, quantity = item.quantity, created, "cart line saved");
        Ok(AddedItem {
            item,
            created,
            product_info: ProductSummary::from(product),
        })
    }

    /// Sets a line's quantity after re-checking availability.
    #[tracing::instrument(skip(self))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<CartItem, CartError> {
        let product_id = self.store.read().await.item(user_id, item_id)?.product_id;
        let quantity = positive(quantity)?;

        if !self.is_available(product_id, quantity).await {
            return Err(CartError::Unavailable);
        }

        let item = self
            .store
            .write()
            .await
            .set_quantity(user_id, item_id, quantity, Utc::now())?;
        metrics::counter!("cart_mutations_total", "op" => "update").increment(1);
        Ok(item)
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, user_id: UserId, item_id: CartItemId) -> Result<(), CartError> {
        self.store
            .write()
            .await
            .remove(user_id, item_id, Utc::now())?;
        metrics::counter!("cart_mutations_total", "op" => "remove").increment(1);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), CartError> {
        let removed = self.store.write().await.clear(user_id, Utc::now())?;
        metrics::counter!("cart_mutations_total", "op" => "clear").increment(1);
        tracing::info!(removed, "cart cleared");
        Ok(())
    }

    /// Returns the user's cart, creating it on first access, with live
    /// product details next to each line.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, user_id: UserId) -> CartView {
        let cart = self
            .store
            .write()
            .await
            .get_or_create(user_id, Utc::now())
            .clone();

        let mut items = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let info = match self.products.get_product(item.product_id).await {
                Ok(info) => info.map(ProductSummary::from),
                Err(e) => {
                    tracing::error!(product_id = %item.product_id, error = %e, "product lookup failed");
                    None
                }
            };
            items.push(CartItemView::new(item, info));
        }

        CartView {
            id: cart.id,
            user_id: cart.user_id,
            total_items: cart.total_items(),
            total_amount: cart.total_amount(),
            items,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }

    /// Totals of the user's cart; zeros when the user has none.
    pub async fn summary(&self, user_id: UserId) -> CartSummary {
        self.store
            .read()
            .await
            .cart(user_id)
            .map(|c| c.summary())
            .unwrap_or_else(CartSummary::empty)
    }
}

/// Lets the order saga read and clear carts in-process.
#[async_trait]
impl CartGateway for CartService {
    async fn fetch_cart(
        &self,
        user_id: UserId,
        _token: &AccessToken,
    ) -> Result<Option<CartSnapshot>, ClientError> {
        Ok(self.store.read().await.cart(user_id).map(|c| c.snapshot()))
    }

    async fn clear_cart(&self, user_id: UserId, _token: &AccessToken) -> Result<(), ClientError> {
        match CartService::clear_cart(self, user_id).await {
            Ok(()) | Err(CartError::CartNotFound) => Ok(()),
            Err(e) => Err(ClientError::Rejected {
                service: "cart-service",
                status: 400,
                detail: e.to_string(),
            }),
        }
    }
}
