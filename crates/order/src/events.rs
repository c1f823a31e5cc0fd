//! Payloads of the order lifecycle events.

use common::{Money, OrderId, ProductId, UserId};
use serde::Serialize;

use crate::models::{CustomerInfo, Order};
use crate::state::OrderStatus;

#[derive(Debug, Clone, Serialize)]
pub struct CreatedItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Money,
}

/// `order.created`
#[derive(Debug, Clone, Serialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub items: Vec<CreatedItem>,
    pub total_amount: Money,
    pub customer_info: CustomerInfo,
}

impl OrderCreated {
    pub fn new(order: &Order, customer_info: &CustomerInfo) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            items: order
                .items
                .iter()
                .map(|item| CreatedItem {
                    product_id: item.product_id,
                    product_name: item.product_name.clone(),
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            total_amount: order.total_amount,
            customer_info: customer_info.clone(),
        }
    }
}

/// `order.status_changed`
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusChanged {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
}

/// A quantity of one product taken out of, or put back into, stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// `order.cancelled`
#[derive(Debug, Clone, Serialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub items: Vec<StockLine>,
}

impl From<&Order> for OrderCancelled {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            items: order
                .items
                .iter()
                .map(|item| StockLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}
