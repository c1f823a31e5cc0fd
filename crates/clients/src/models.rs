//! Wire types exchanged between services.
//!
//! Decoding ignores fields it does not know, so a service may return a
//! richer representation than the one its callers read.

use common::{CartId, CartItemId, Identity, Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A product as seen by callers of the product directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock_quantity: u32,
    pub is_active: bool,
    #[serde(default)]
    pub image_url: String,
}

/// Answer to an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub available: bool,
    pub stock_quantity: u32,
    pub requested_quantity: u32,
}

/// Stock remaining after a reserve or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: ProductId,
    pub stock_quantity: u32,
}

/// One line of a cart with its snapshotted price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Money,
}

impl CartLine {
    /// Returns price × quantity.
    pub fn subtotal(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// A user's cart as read by the order saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartLine>,
}

impl CartSnapshot {
    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the sum of line subtotals.
    pub fn total_amount(&self) -> Money {
        self.items.iter().map(CartLine::subtotal).sum()
    }

    /// Returns the sum of line quantities.
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }
}

/// Identity record served by the user directory's `user-info` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
}

impl From<UserInfo> for Identity {
    fn from(info: UserInfo) -> Self {
        Identity {
            user_id: info.id,
            email: info.email,
            username: info.username,
            first_name: info.first_name,
            last_name: info.last_name,
            is_staff: info.is_staff,
        }
    }
}

impl From<&Identity> for UserInfo {
    fn from(identity: &Identity) -> Self {
        UserInfo {
            id: identity.user_id,
            email: identity.email.clone(),
            username: identity.username.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            is_staff: identity.is_staff,
        }
    }
}
