//! In-memory cart table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{CartId, CartItemId, IdSequence, Money, ProductId, UserId};

use crate::error::CartError;
use crate::models::{Cart, CartItem};

#[derive(Debug, Default)]
pub struct CartStore {
    carts: HashMap<UserId, Cart>,
    cart_ids: IdSequence,
    item_ids: IdSequence,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cart(&self, user_id: UserId) -> Option<&Cart> {
        self.carts.get(&user_id)
    }

    /// Returns the user's cart, creating an empty one on first access.
    pub fn get_or_create(&mut self, user_id: UserId, now: DateTime<Utc>) -> &mut Cart {
        Self::entry(&mut self.carts, &mut self.cart_ids, user_id, now)
    }

    fn entry<'a>(
        carts: &'a mut HashMap<UserId, Cart>,
        ids: &mut IdSequence,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> &'a mut Cart {
        carts.entry(user_id).or_insert_with(|| {
            tracing::info!(%user_id, "created cart");
            Cart {
                id: CartId::new(ids.next_value()),
                user_id,
                items: Vec::new(),
                created_at: now,
                updated_at: now,
            }
        })
    }

    /// Quantity of `product_id` already in the user's cart.
    pub fn quantity_of(&self, user_id: UserId, product_id: ProductId) -> Option<u32> {
        self.cart(user_id)?
            .items
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)
    }

    /// Adds `quantity` to the product's line, creating it if needed.
    ///
    /// `expected` is the line quantity the caller validated against stock
    /// (`None` for no line). Fails with `QuantityChanged`, leaving the cart
    /// untouched, if the stored quantity differs.
    ///
    /// Returns the line and whether it was created.
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        user_id: UserId,
        product_id: ProductId,
        product_name: &str,
        price: Money,
        expected: Option<u32>,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<(CartItem, bool), CartError> {
        let actual = self.quantity_of(user_id, product_id);
        if actual != expected {
            return Err(CartError::QuantityChanged);
        }

        let cart = Self::entry(&mut self.carts, &mut self.cart_ids, user_id, now);
        cart.updated_at = now;

        if let Some(item) = cart.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = item
                .quantity
                .checked_add(quantity)
                .ok_or(CartError::Unavailable)?;
            return Ok((item.clone(), false));
        }

        let item = CartItem {
            id: CartItemId::new(self.item_ids.next_value()),
            product_id,
            product_name: product_name.to_string(),
            quantity,
            price,
            created_at: now,
        };
        cart.items.push(item.clone());
        Ok((item, true))
    }

    /// Finds a line by id within the user's own cart.
    pub fn item(&self, user_id: UserId, item_id: CartItemId) -> Result<&CartItem, CartError> {
        self.cart(user_id)
            .and_then(|c| c.items.iter().find(|i| i.id == item_id))
            .ok_or(CartError::ItemNotFound)
    }

    pub fn set_quantity(
        &mut self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<CartItem, CartError> {
        let cart = self.carts.get_mut(&user_id).ok_or(CartError::ItemNotFound)?;
        let item = cart
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(CartError::ItemNotFound)?;
        item.quantity = quantity;
        let item = item.clone();
        cart.updated_at = now;
        Ok(item)
    }

    pub fn remove(
        &mut self,
        user_id: UserId,
        item_id: CartItemId,
        now: DateTime<Utc>,
    ) -> Result<CartItem, CartError> {
        let cart = self.carts.get_mut(&user_id).ok_or(CartError::ItemNotFound)?;
        let position = cart
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or(CartError::ItemNotFound)?;
        cart.updated_at = now;
        Ok(cart.items.remove(position))
    }

    /// Removes every line. Fails if the user has never had a cart.
    pub fn clear(&mut self, user_id: UserId, now: DateTime<Utc>) -> Result<usize, CartError> {
        let cart = self.carts.get_mut(&user_id).ok_or(CartError::CartNotFound)?;
        let removed = cart.items.len();
        cart.items.clear();
        cart.updated_at = now;
        Ok(removed)
    }
}
