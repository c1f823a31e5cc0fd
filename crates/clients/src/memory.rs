//! In-memory implementations of the service contracts for testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use common::{AccessToken, Identity, ProductId, UserId};

use crate::cart::CartGateway;
use crate::error::ClientError;
use crate::models::{Availability, CartSnapshot, ProductInfo, StockLevel};
use crate::product::ProductDirectory;
use crate::user::UserDirectory;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unreachable(service: &'static str) -> ClientError {
    ClientError::Transport {
        service,
        detail: "connection refused".to_string(),
    }
}

#[derive(Debug, Default)]
struct ProductState {
    products: HashMap<ProductId, ProductInfo>,
    fail_reserve_for: HashSet<ProductId>,
    fail_on_release: bool,
    unreachable: bool,
    reserved: Vec<(ProductId, u32)>,
    released: Vec<(ProductId, u32)>,
}

/// In-memory product directory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductDirectory {
    state: Arc<Mutex<ProductState>>,
}

impl InMemoryProductDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn insert(&self, product: ProductInfo) {
        lock(&self.state).products.insert(product.id, product);
    }

    /// Returns the current stock of a product.
    pub fn stock(&self, product_id: ProductId) -> Option<u32> {
        lock(&self.state)
            .products
            .get(&product_id)
            .map(|p| p.stock_quantity)
    }

    /// Makes every reserve of `product_id` fail as insufficient stock.
    pub fn set_fail_reserve_for(&self, product_id: ProductId) {
        lock(&self.state).fail_reserve_for.insert(product_id);
    }

    /// Configures release calls to fail.
    pub fn set_fail_on_release(&self, fail: bool) {
        lock(&self.state).fail_on_release = fail;
    }

    /// Makes every call fail at transport level.
    pub fn set_unreachable(&self, unreachable: bool) {
        lock(&self.state).unreachable = unreachable;
    }

    /// Returns every successful reservation, in call order.
    pub fn reserved(&self) -> Vec<(ProductId, u32)> {
        lock(&self.state).reserved.clone()
    }

    /// Returns every successful release, in call order.
    pub fn released(&self) -> Vec<(ProductId, u32)> {
        lock(&self.state).released.clone()
    }
}

fn product_rejection(status: u16, detail: &str) -> ClientError {
    ClientError::Rejected {
        service: "product-service",
        status,
        detail: detail.to_string(),
    }
}

#[async_trait]
impl ProductDirectory for InMemoryProductDirectory {
    async fn get_product(&self, product_id: ProductId) -> Result<Option<ProductInfo>, ClientError> {
        let state = lock(&self.state);
        if state.unreachable {
            return Err(unreachable("product-service"));
        }
        Ok(state.products.get(&product_id).cloned())
    }

    async fn check_availability(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Option<Availability>, ClientError> {
        let state = lock(&self.state);
        if state.unreachable {
            return Err(unreachable("product-service"));
        }
        Ok(state.products.get(&product_id).map(|p| Availability {
            product_id,
            name: p.name.clone(),
            price: p.price,
            available: p.stock_quantity >= quantity,
            stock_quantity: p.stock_quantity,
            requested_quantity: quantity,
        }))
    }

    async fn reserve(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<StockLevel, ClientError> {
        let mut state = lock(&self.state);
        if state.unreachable {
            return Err(unreachable("product-service"));
        }
        let forced_failure = state.fail_reserve_for.contains(&product_id);
        let product = state
            .products
            .get_mut(&product_id)
            .ok_or_else(|| product_rejection(404, "Product not found."))?;

        if forced_failure || product.stock_quantity < quantity {
            return Err(product_rejection(400, "Insufficient stock quantity."));
        }
        product.stock_quantity -= quantity;
        let level = StockLevel {
            product_id,
            stock_quantity: product.stock_quantity,
        };
        state.reserved.push((product_id, quantity));
        Ok(level)
    }

    async fn release(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<StockLevel, ClientError> {
        let mut state = lock(&self.state);
        if state.unreachable {
            return Err(unreachable("product-service"));
        }
        if state.fail_on_release {
            return Err(product_rejection(500, "release failed"));
        }
        let product = state
            .products
            .get_mut(&product_id)
            .ok_or_else(|| product_rejection(404, "Product not found."))?;

        product.stock_quantity += quantity;
        let level = StockLevel {
            product_id,
            stock_quantity: product.stock_quantity,
        };
        state.released.push((product_id, quantity));
        Ok(level)
    }
}

#[derive(Debug, Default)]
struct CartState {
    carts: HashMap<UserId, CartSnapshot>,
    cleared: Vec<UserId>,
    unreachable: bool,
}

/// In-memory cart gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartGateway {
    state: Arc<Mutex<CartState>>,
}

impl InMemoryCartGateway {
    /// Creates a gateway with no carts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `cart` as its user's cart.
    pub fn insert(&self, cart: CartSnapshot) {
        lock(&self.state).carts.insert(cart.user_id, cart);
    }

    /// Makes every call fail at transport level.
    pub fn set_unreachable(&self, unreachable: bool) {
        lock(&self.state).unreachable = unreachable;
    }

    /// Returns the users whose carts were cleared, in call order.
    pub fn cleared(&self) -> Vec<UserId> {
        lock(&self.state).cleared.clone()
    }
}

#[async_trait]
impl CartGateway for InMemoryCartGateway {
    async fn fetch_cart(
        &self,
        user_id: UserId,
        _token: &AccessToken,
    ) -> Result<Option<CartSnapshot>, ClientError> {
        let state = lock(&self.state);
        if state.unreachable {
            return Err(unreachable("cart-service"));
        }
        Ok(state.carts.get(&user_id).cloned())
    }

    async fn clear_cart(&self, user_id: UserId, _token: &AccessToken) -> Result<(), ClientError> {
        let mut state = lock(&self.state);
        if state.unreachable {
            return Err(unreachable("cart-service"));
        }
        if let Some(cart) = state.carts.get_mut(&user_id) {
            cart.items.clear();
        }
        state.cleared.push(user_id);
        Ok(())
    }
}

/// In-memory user directory for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    tokens: Arc<Mutex<HashMap<String, Identity>>>,
}

impl InMemoryUserDirectory {
    /// Creates a directory that knows no tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` as belonging to `identity`.
    pub fn insert(&self, token: &AccessToken, identity: Identity) {
        lock(&self.tokens).insert(token.as_str().to_string(), identity);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn user_from_token(&self, token: &AccessToken) -> Result<Option<Identity>, ClientError> {
        Ok(lock(&self.tokens).get(token.as_str()).cloned())
    }
}
