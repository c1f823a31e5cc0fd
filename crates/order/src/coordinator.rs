//! Saga coordinator for checkout and the order lifecycle.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clients::{CartGateway, CartLine, ProductDirectory, UserDirectory};
use common::{AccessToken, OrderId, UserId};
use event_bus::{
    EventEnvelope, EventPublisher, ORDER_CANCELLED, ORDER_CREATED, ORDER_STATUS_CHANGED,
};
use serde::Serialize;

use crate::error::OrderError;
use crate::events::{OrderCancelled, OrderCreated, OrderStatusChanged, StockLine};
use crate::models::{CreateOrderRequest, Order, OrderStatistics};
use crate::repository::{OrderRepository, RepositoryError};
use crate::saga;
use crate::state::OrderStatus;

/// Orchestrates checkout across the cart, user and product services.
///
/// Checkout reads the cart, resolves the user, reserves every line, then
/// writes the order. A failure after any reservation runs the compensating
/// releases before the error is returned. Event publishing never fails
/// an operation.
#[derive(Clone)]
pub struct OrderSagaCoordinator {
    carts: Arc<dyn CartGateway>,
    users: Arc<dyn UserDirectory>,
    products: Arc<dyn ProductDirectory>,
    orders: Arc<dyn OrderRepository>,
    events: Arc<dyn EventPublisher>,
}

impl OrderSagaCoordinator {
    pub fn new(
        carts: Arc<dyn CartGateway>,
        users: Arc<dyn UserDirectory>,
        products: Arc<dyn ProductDirectory>,
        orders: Arc<dyn OrderRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            carts,
            users,
            products,
            orders,
            events,
        }
    }

    /// Places an order from the caller's cart.
    ///
    /// `token` is forwarded to the cart and user services.
    #[tracing::instrument(skip(self, token, request), fields(saga_type = saga::SAGA_TYPE))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        token: &AccessToken,
        request: CreateOrderRequest,
    ) -> Result<Order, OrderError> {
        metrics::counter!("saga_executions_total").increment(1);
        let saga_start = Instant::now();

        let result = self.checkout(user_id, token, &request).await;

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        match &result {
            Ok(order) => {
                metrics::counter!("saga_completed").increment(1);
                tracing::info!(order_id = %order.id, duration, "saga completed successfully");
            }
            Err(e) => {
                metrics::counter!("saga_failed").increment(1);
                tracing::warn!(error = %e, duration, "saga failed");
            }
        }
        result
    }

    async fn checkout(
        &self,
        user_id: UserId,
        token: &AccessToken,
        request: &CreateOrderRequest,
    ) -> Result<Order, OrderError> {
        if request.shipping_address.trim().is_empty() {
            return Err(OrderError::MissingShippingAddress);
        }

        tracing::info!(step = saga::STEP_FETCH_CART, "saga step started");
        let cart = self
            .carts
            .fetch_cart(user_id, token)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(OrderError::EmptyCart)?;

        tracing::info!(step = saga::STEP_FETCH_USER, "saga step started");
        let identity = self
            .users
            .user_from_token(token)
            .await?
            .ok_or(OrderError::UserNotFound)?;

        tracing::info!(
            step = saga::STEP_RESERVE_STOCK,
            lines = cart.items.len(),
            "saga step started"
        );
        let reserved = self.reserve_lines(&cart.items).await?;

        tracing::info!(step = saga::STEP_PERSIST_ORDER, "saga step started");
        let new_order = request.to_new_order(&identity, &cart.items);
        let order = match self.orders.insert(new_order, Utc::now()).await {
            Ok(order) => order,
            Err(e) => {
                tracing::error!(step = saga::STEP_PERSIST_ORDER, error = %e, "saga step failed");
                self.compensate(&reserved).await;
                return Err(OrderError::Persistence(e));
            }
        };

        self.publish(
            ORDER_CREATED,
            &OrderCreated::new(&order, &request.customer_info),
        )
        .await;

        tracing::info!(step = saga::STEP_CLEAR_CART, "saga step started");
        if let Err(e) = self.carts.clear_cart(user_id, token).await {
            tracing::warn!(step = saga::STEP_CLEAR_CART, error = %e, "saga step failed");
        }

        Ok(order)
    }

    /// Reserves every line in order. On the first refusal the lines reserved
    /// so far are released before the error is returned.
    async fn reserve_lines(&self, lines: &[CartLine]) -> Result<Vec<StockLine>, OrderError> {
        let mut reserved = Vec::with_capacity(lines.len());

        for line in lines {
            match self.products.reserve(line.product_id, line.quantity).await {
                Ok(level) => {
                    tracing::debug!(
                        product_id = %line.product_id,
                        quantity = line.quantity,
                        remaining = level.stock_quantity,
                        "stock reserved"
                    );
                    reserved.push(StockLine {
                        product_id: line.product_id,
                        quantity: line.quantity,
                    });
                }
                Err(e) => {
                    tracing::error!(
                        step = saga::STEP_RESERVE_STOCK,
                        product_id = %line.product_id,
                        error = %e,
                        "saga step failed"
                    );
                    self.compensate(&reserved).await;
                    return Err(OrderError::ReservationFailed {
                        product_id: line.product_id,
                        reason: e.detail().to_string(),
                    });
                }
            }
        }
        Ok(reserved)
    }

    /// Puts stock back in reverse order. A failed release is logged and
    /// the remaining lines are still released.
    #[tracing::instrument(skip_all, fields(lines = lines.len()))]
    async fn compensate(&self, lines: &[StockLine]) {
        for line in lines.iter().rev() {
            match self.products.release(line.product_id, line.quantity).await {
                Ok(_) => {
                    metrics::counter!("saga_compensations_total", "outcome" => "released")
                        .increment(1);
                }
                Err(e) => {
                    metrics::counter!("saga_compensations_total", "outcome" => "failed")
                        .increment(1);
                    tracing::error!(
                        product_id = %line.product_id,
                        quantity = line.quantity,
                        error = %e,
                        "compensating release failed"
                    );
                }
            }
        }
    }

    /// Moves an order to `new_status`.
    ///
    /// The write only succeeds if the status is still the one validated
    /// against, so a concurrent transition is never overwritten. Cancelling
    /// releases every ordered quantity.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let current = self
            .orders
            .get(order_id)
            .await
            .map_err(OrderError::Storage)?
            .ok_or(OrderError::NotFound { order_id })?;

        let old_status = current.status;
        if !old_status.can_transition_to(new_status) {
            return Err(OrderError::InvalidTransition {
                from: old_status,
                to: new_status,
            });
        }

        let order = self
            .orders
            .update_status(order_id, old_status, new_status, Utc::now())
            .await
            .map_err(|e| match e {
                RepositoryError::StatusMismatch { actual, .. } => OrderError::InvalidTransition {
                    from: actual,
                    to: new_status,
                },
                RepositoryError::NotFound(order_id) => OrderError::NotFound { order_id },
                other => OrderError::Storage(other),
            })?;

        metrics::counter!("order_status_changes_total", "status" => new_status.as_str())
            .increment(1);
        tracing::info!(%old_status, %new_status, "order status changed");
        self.publish(
            ORDER_STATUS_CHANGED,
            &OrderStatusChanged {
                order_id,
                user_id: order.user_id,
                old_status,
                new_status,
            },
        )
        .await;

        if new_status == OrderStatus::Cancelled {
            let cancelled = OrderCancelled::from(&order);
            self.compensate(&cancelled.items).await;
            self.publish(ORDER_CANCELLED, &cancelled).await;
        }

        Ok(order)
    }

    /// Returns the user's orders, newest first.
    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        self.orders
            .list_for_user(user_id)
            .await
            .map_err(OrderError::Storage)
    }

    /// Returns one of the user's orders. Other users' orders are not found.
    pub async fn get_order(&self, user_id: UserId, order_id: OrderId) -> Result<Order, OrderError> {
        self.orders
            .get(order_id)
            .await
            .map_err(OrderError::Storage)?
            .filter(|order| order.user_id == user_id)
            .ok_or(OrderError::NotFound { order_id })
    }

    pub async fn statistics(&self, user_id: UserId) -> Result<OrderStatistics, OrderError> {
        let orders = self.list_orders(user_id).await?;
        Ok(OrderStatistics::from_orders(&orders))
    }

    /// Publishes one event. Failures are logged, never returned.
    async fn publish(&self, event_type: &str, payload: &impl Serialize) {
        let result = match EventEnvelope::new(event_type, payload) {
            Ok(envelope) => self.events.publish(envelope).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::error!(event_type, error = %e, "failed to publish event");
        }
    }
}
