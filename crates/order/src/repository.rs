//! Order storage.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{IdSequence, OrderId, OrderItemId, UserId};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{NewOrder, Order, OrderItem};
use crate::state::OrderStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Order {0} not found")]
    NotFound(OrderId),

    /// A compare-and-set found a different status than expected.
    #[error("Order {order_id} is {actual}, expected {expected}")]
    StatusMismatch {
        order_id: OrderId,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    #[error("Order storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence port for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Writes an order and all its lines, or nothing. New orders are pending.
    async fn insert(&self, order: NewOrder, now: DateTime<Utc>) -> Result<Order, RepositoryError>;

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Returns a user's orders, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Sets the status to `new` only if it is still `expected`.
    async fn update_status(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, RepositoryError>;
}

#[derive(Debug, Default)]
struct OrderTable {
    orders: BTreeMap<OrderId, Order>,
    order_ids: IdSequence,
    item_ids: IdSequence,
    fail_on_insert: bool,
}

/// In-memory order repository.
///
/// One write lock covers the order and its lines, so an insert is
/// all-or-nothing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    table: Arc<RwLock<OrderTable>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures inserts to fail.
    pub async fn set_fail_on_insert(&self, fail: bool) {
        self.table.write().await.fail_on_insert = fail;
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.table.read().await.orders.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: NewOrder, now: DateTime<Utc>) -> Result<Order, RepositoryError> {
        let mut table = self.table.write().await;
        if table.fail_on_insert {
            return Err(RepositoryError::Unavailable(
                "insert rejected by storage".to_string(),
            ));
        }

        let total_amount = order.total_amount();
        let id = OrderId::new(table.order_ids.next_value());
        let items = order
            .lines
            .into_iter()
            .map(|line| OrderItem {
                id: OrderItemId::new(table.item_ids.next_value()),
                product_id: line.product_id,
                product_name: line.product_name,
                quantity: line.quantity,
                price: line.price,
                created_at: now,
            })
            .collect();

        let stored = Order {
            id,
            user_id: order.user_id,
            user_email: order.user_email,
            user_name: order.user_name,
            status: OrderStatus::Pending,
            total_amount,
            shipping_address: order.shipping_address,
            items,
            created_at: now,
            updated_at: now,
        };
        table.orders.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.table.read().await.orders.get(&order_id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let table = self.table.read().await;
        Ok(table
            .orders
            .values()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, RepositoryError> {
        let mut table = self.table.write().await;
        let order = table
            .orders
            .get_mut(&order_id)
            .ok_or(RepositoryError::NotFound(order_id))?;

        if order.status != expected {
            return Err(RepositoryError::StatusMismatch {
                order_id,
                expected,
                actual: order.status,
            });
        }
        order.status = new;
        order.updated_at = now;
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use common::{Money, ProductId};

    use super::*;
    use crate::models::NewOrderLine;

    fn new_order(user: i64) -> NewOrder {
        NewOrder {
            user_id: UserId::new(user),
            user_email: "ada@example.com".to_string(),
            user_name: "Ada".to_string(),
            shipping_address: "1 Main Street".to_string(),
            lines: vec![
                NewOrderLine {
                    product_id: ProductId::new(1),
                    product_name: "Widget".to_string(),
                    quantity: 2,
                    price: Money::from_cents(1000),
                },
                NewOrderLine {
                    product_id: ProductId::new(2),
                    product_name: "Gadget".to_string(),
                    quantity: 1,
                    price: Money::from_cents(250),
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_totals() {
        let repo = InMemoryOrderRepository::new();
        let order = repo.insert(new_order(1), Utc::now()).await.unwrap();

        assert_eq!(order.id, OrderId::new(1));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, Money::from_cents(2250));
        assert_eq!(order.items[0].id, OrderItemId::new(1));
        assert_eq!(order.items[1].id, OrderItemId::new(2));

        let again = repo.insert(new_order(1), Utc::now()).await.unwrap();
        assert_eq!(again.id, OrderId::new(2));
        assert_eq!(again.items[0].id, OrderItemId::new(3));
    }

    #[tokio::test]
    async fn test_failed_insert_writes_nothing() {
        let repo = InMemoryOrderRepository::new();
        repo.set_fail_on_insert(true).await;

        let result = repo.insert(new_order(1), Utc::now()).await;
        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
        assert_eq!(repo.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first() {
        let repo = InMemoryOrderRepository::new();
        repo.insert(new_order(1), Utc::now()).await.unwrap();
        repo.insert(new_order(2), Utc::now()).await.unwrap();
        repo.insert(new_order(1), Utc::now()).await.unwrap();

        let ids: Vec<OrderId> = repo
            .list_for_user(UserId::new(1))
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![OrderId::new(3), OrderId::new(1)]);
    }

    #[tokio::test]
    async fn test_update_status_is_compare_and_set() {
        let repo = InMemoryOrderRepository::new();
        let order = repo.insert(new_order(1), Utc::now()).await.unwrap();

        let updated = repo
            .update_status(
                order.id,
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Confirmed);

        let stale = repo
            .update_status(
                order.id,
                OrderStatus::Pending,
                OrderStatus::Cancelled,
                Utc::now(),
            )
            .await;
        assert_eq!(
            stale,
            Err(RepositoryError::StatusMismatch {
                order_id: order.id,
                expected: OrderStatus::Pending,
                actual: OrderStatus::Confirmed,
            })
        );
        let stored = repo.get(order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_update_missing_order() {
        let repo = InMemoryOrderRepository::new();
        let result = repo
            .update_status(
                OrderId::new(9),
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                Utc::now(),
            )
            .await;
        assert_eq!(result, Err(RepositoryError::NotFound(OrderId::new(9))));
    }
}
