//! Checkout saga constants.

/// The saga type identifier for checkout.
pub const SAGA_TYPE: &str = "OrderCheckout";

/// Step name: Read the caller's cart.
pub const STEP_FETCH_CART: &str = "fetch_cart";

/// Step name: Resolve the caller's account.
pub const STEP_FETCH_USER: &str = "fetch_user";

/// Step name: Reserve stock for every cart line.
pub const STEP_RESERVE_STOCK: &str = "reserve_stock";

/// Step name: Write the order and its lines.
pub const STEP_PERSIST_ORDER: &str = "persist_order";

/// Step name: Empty the cart the order was placed from.
pub const STEP_CLEAR_CART: &str = "clear_cart";
