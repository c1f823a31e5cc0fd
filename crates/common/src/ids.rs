//! Typed record identifiers.
//!
//! Records are keyed by sequential integers assigned by the owning service.
//! Each kind of record gets its own newtype so a product id can never be
//! passed where an order id is expected.

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an id from its raw value.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

record_id!(
    /// Identifier of a registered user.
    UserId
);
record_id!(
    /// Identifier of a product in the directory.
    ProductId
);
record_id!(
    /// Identifier of a product category.
    CategoryId
);
record_id!(
    /// Identifier of a user's cart.
    CartId
);
record_id!(
    /// Identifier of a single cart line.
    CartItemId
);
record_id!(
    /// Identifier of a placed order.
    OrderId
);
record_id!(
    /// Identifier of an order line.
    OrderItemId
);

/// Hands out sequential ids starting at 1.
///
/// Stores keep one of these per table behind their own lock.
#[derive(Debug, Default, Clone)]
pub struct IdSequence {
    last: i64,
}

impl IdSequence {
    /// Creates a sequence whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next raw id.
    pub fn next_value(&mut self) -> i64 {
        self.last += 1;
        self.last
    }
}
