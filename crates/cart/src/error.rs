//! Cart error types.

use clients::ClientError;
use service_kit::ApiError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Ensure this value is greater than or equal to 1.")]
    InvalidQuantity,

    #[error("Product does not exist.")]
    ProductNotFound,

    #[error("Product is not active.")]
    ProductInactive,

    #[error("Product not available in requested quantity.")]
    Unavailable,

    #[error("Not found.")]
    ItemNotFound,

    #[error("Cart not found.")]
    CartNotFound,

    /// The line changed between the availability check and the write.
    #[error("Cart was modified concurrently, please retry.")]
    QuantityChanged,

    #[error(transparent)]
    Upstream(#[from] ClientError),
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound | CartError::ItemNotFound | CartError::CartNotFound => {
                ApiError::NotFound(err.to_string())
            }
            CartError::Upstream(e) => e.into(),
            CartError::InvalidQuantity
            | CartError::ProductInactive
            | CartError::Unavailable
            | CartError::QuantityChanged => ApiError::BadRequest(err.to_string()),
        }
    }
}
