//! Shared value types for the storefront services.
//!
//! Every service speaks in terms of these: typed integer identifiers,
//! [`Money`] amounts held in cents, and the authenticated [`Identity`]
//! that handlers check capabilities against.

pub mod auth;
pub mod ids;
pub mod money;

pub use auth::{AccessToken, AuthError, Capability, Identity, authorize};
pub use ids::{
    CartId, CartItemId, CategoryId, IdSequence, OrderId, OrderItemId, ProductId, UserId,
};
pub use money::{Money, MoneyParseError};
