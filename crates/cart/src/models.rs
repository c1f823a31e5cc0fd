//! Cart records and their rendered forms.

use chrono::{DateTime, Utc};
use clients::{CartLine, CartSnapshot, ProductInfo};
use common::{CartId, CartItemId, Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// One product line. `product_name` and `price` are snapshots taken when the
/// line was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Money,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    pub fn subtotal(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// A user's cart. At most one line per product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn total_amount(&self) -> Money {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            total_items: self.total_items(),
            total_amount: self.total_amount(),
            items_count: self.items.len(),
        }
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            id: self.id,
            user_id: self.user_id,
            items: self
                .items
                .iter()
                .map(|i| CartLine {
                    id: i.id,
                    product_id: i.product_id,
                    product_name: i.product_name.clone(),
                    quantity: i.quantity,
                    price: i.price,
                })
                .collect(),
        }
    }
}

/// Live product details shown next to a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub name: String,
    pub current_price: Money,
    pub image_url: String,
    pub is_active: bool,
    pub stock_quantity: u32,
}

impl From<ProductInfo> for ProductSummary {
    fn from(p: ProductInfo) -> Self {
        Self {
            name: p.name,
            current_price: p.price,
            image_url: p.image_url,
            is_active: p.is_active,
            stock_quantity: p.stock_quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Money,
    pub subtotal: Money,
    /// `None` when the product directory could not describe the product.
    pub product_info: Option<ProductSummary>,
    pub created_at: DateTime<Utc>,
}

impl CartItemView {
    pub fn new(item: &CartItem, product_info: Option<ProductSummary>) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            price: item.price,
            subtotal: item.subtotal(),
            product_info,
            created_at: item.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItemView>,
    pub total_items: u32,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub total_items: u32,
    pub total_amount: Money,
    pub items_count: usize,
}

impl CartSummary {
    pub fn empty() -> Self {
        Self {
            total_items: 0,
            total_amount: Money::zero(),
            items_count: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

/// Result of adding a product: the line and whether it was newly created.
#[derive(Debug, Clone)]
pub struct AddedItem {
    pub item: CartItem,
    pub created: bool,
    pub product_info: ProductSummary,
}
