//! Order records, request bodies and response views.

use chrono::{DateTime, Utc};
use clients::CartLine;
use common::{Identity, Money, OrderId, OrderItemId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::state::OrderStatus;

/// A line of a placed order. Name and price are copied from the cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Money,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn subtotal(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub user_email: String,
    pub user_name: String,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub shipping_address: String,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the number of lines.
    pub fn items_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the sum of line quantities.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// A line to be written with a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub price: Money,
}

impl From<&CartLine> for NewOrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            price: line.price,
        }
    }
}

/// Everything needed to persist an order; ids and timestamps are assigned
/// by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub user_email: String,
    pub user_name: String,
    pub shipping_address: String,
    pub lines: Vec<NewOrderLine>,
}

impl NewOrder {
    /// Returns Σ price × quantity over the lines.
    pub fn total_amount(&self) -> Money {
        self.lines.iter().map(|l| l.price.multiply(l.quantity)).sum()
    }
}

/// Contact details supplied at checkout. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl CustomerInfo {
    /// Returns `"first last"`, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Body of `POST /api/orders/create/`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateOrderRequest {
    #[serde(alias = "shipping_data")]
    pub shipping_address: String,
    pub customer_info: CustomerInfo,
    pub special_instructions: String,
}

impl CreateOrderRequest {
    pub fn new(shipping_address: impl Into<String>) -> Self {
        Self {
            shipping_address: shipping_address.into(),
            ..Self::default()
        }
    }

    /// Builds the order record for `identity`, preferring the checkout
    /// contact details over the account's.
    pub fn to_new_order(&self, identity: &Identity, lines: &[CartLine]) -> NewOrder {
        let mut user_name = self.customer_info.full_name();
        if user_name.is_empty() {
            user_name = identity.full_name();
        }
        let user_email = if self.customer_info.email.trim().is_empty() {
            identity.email.clone()
        } else {
            self.customer_info.email.trim().to_string()
        };

        let mut shipping_address = self.shipping_address.trim().to_string();
        let instructions = self.special_instructions.trim();
        if !instructions.is_empty() {
            shipping_address.push_str("\n\nSpecial Instructions: ");
            shipping_address.push_str(instructions);
        }

        NewOrder {
            user_id: identity.user_id,
            user_email,
            user_name,
            shipping_address,
            lines: lines.iter().map(NewOrderLine::from).collect(),
        }
    }
}

/// Body of `PUT /api/orders/{id}/status/`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
    #[serde(flatten)]
    pub item: OrderItem,
    pub subtotal: Money,
}

/// Wire representation of an order with its derived totals.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub user_id: UserId,
    pub user_email: String,
    pub user_name: String,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub items_count: usize,
    pub total_quantity: u32,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let items_count = order.items_count();
        let total_quantity = order.total_quantity();
        Self {
            id: order.id,
            user_id: order.user_id,
            user_email: order.user_email,
            user_name: order.user_name,
            status: order.status,
            total_amount: order.total_amount,
            items_count,
            total_quantity,
            shipping_address: order.shipping_address,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemView {
                    subtotal: item.subtotal(),
                    item,
                })
                .collect(),
        }
    }
}

/// Per-user order counts and spend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderStatistics {
    pub total_orders: usize,
    pub pending_orders: usize,
    pub confirmed_orders: usize,
    pub shipped_orders: usize,
    pub delivered_orders: usize,
    pub cancelled_orders: usize,
    /// Σ total_amount over orders that were not cancelled.
    pub total_spent: Money,
}

impl OrderStatistics {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut stats = Self::default();
        for order in orders {
            stats.total_orders += 1;
            let bucket = match order.status {
                OrderStatus::Pending => &mut stats.pending_orders,
                OrderStatus::Confirmed => &mut stats.confirmed_orders,
                OrderStatus::Shipped => &mut stats.shipped_orders,
                OrderStatus::Delivered => &mut stats.delivered_orders,
                OrderStatus::Cancelled => &mut stats.cancelled_orders,
            };
            *bucket += 1;
            if order.status != OrderStatus::Cancelled {
                stats.total_spent += order.total_amount;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use common::CartItemId;

    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: UserId::new(4),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            is_staff: false,
        }
    }

    fn line(product: i64, quantity: u32, cents: i64) -> CartLine {
        CartLine {
            id: CartItemId::new(product),
            product_id: ProductId::new(product),
            product_name: format!("Product {product}"),
            quantity,
            price: Money::from_cents(cents),
        }
    }

    fn order(id: i64, status: OrderStatus, cents: i64) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(4),
            user_email: String::new(),
            user_name: String::new(),
            status,
            total_amount: Money::from_cents(cents),
            shipping_address: "1 Main Street".to_string(),
            items: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn contact_details_fall_back_to_account() {
        let request = CreateOrderRequest::new("  1 Main Street, Springfield ");
        let new_order = request.to_new_order(&identity(), &[line(1, 2, 1000)]);

        assert_eq!(new_order.user_name, "Ada Lovelace");
        assert_eq!(new_order.user_email, "ada@example.com");
        assert_eq!(new_order.shipping_address, "1 Main Street, Springfield");
        assert_eq!(new_order.total_amount().to_string(), "20.00");
    }

    #[test]
    fn checkout_contact_details_win() {
        let mut request = CreateOrderRequest::new("1 Main Street, Springfield");
        request.customer_info = CustomerInfo {
            first_name: "Grace".to_string(),
            last_name: String::new(),
            email: "grace@example.com".to_string(),
            phone: "555-0100".to_string(),
        };
        request.special_instructions = "Leave at the door".to_string();

        let new_order = request.to_new_order(&identity(), &[line(1, 1, 500), line(2, 3, 250)]);
        assert_eq!(new_order.user_name, "Grace");
        assert_eq!(new_order.user_email, "grace@example.com");
        assert_eq!(
            new_order.shipping_address,
            "1 Main Street, Springfield\n\nSpecial Instructions: Leave at the door"
        );
        assert_eq!(new_order.total_amount(), Money::from_cents(1250));
    }

    #[test]
    fn request_accepts_legacy_shipping_key() {
        let request: CreateOrderRequest =
            serde_json::from_str(r#"{"shipping_data": "1 Main Street"}"#).unwrap();
        assert_eq!(request.shipping_address, "1 Main Street");
        assert_eq!(request.customer_info, CustomerInfo::default());
    }

    #[test]
    fn view_carries_derived_totals() {
        let mut o = order(1, OrderStatus::Pending, 2000);
        o.items.push(OrderItem {
            id: OrderItemId::new(1),
            product_id: ProductId::new(1),
            product_name: "Widget".to_string(),
            quantity: 2,
            price: Money::from_cents(1000),
            created_at: o.created_at,
        });

        let json = serde_json::to_value(OrderView::from(o)).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["total_amount"], "20.00");
        assert_eq!(json["items_count"], 1);
        assert_eq!(json["total_quantity"], 2);
        assert_eq!(json["items"][0]["subtotal"], "20.00");
        assert_eq!(json["items"][0]["product_name"], "Widget");
    }

    #[test]
    fn statistics_exclude_cancelled_spend() {
        let orders = [
            order(1, OrderStatus::Pending, 1000),
            order(2, OrderStatus::Delivered, 2500),
            order(3, OrderStatus::Cancelled, 9900),
            order(4, OrderStatus::Pending, 500),
        ];
        let stats = OrderStatistics::from_orders(&orders);

        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.pending_orders, 2);
        assert_eq!(stats.delivered_orders, 1);
        assert_eq!(stats.cancelled_orders, 1);
        assert_eq!(stats.confirmed_orders, 0);
        assert_eq!(stats.total_spent.to_string(), "40.00");
    }

    #[test]
    fn statistics_of_nothing() {
        let stats = OrderStatistics::from_orders(&[]);
        assert_eq!(stats, OrderStatistics::default());
        assert!(stats.total_spent.is_zero());
    }
}
