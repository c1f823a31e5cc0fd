//! Product directory error types.

use common::{CategoryId, ProductId};
use service_kit::ApiError;
use thiserror::Error;

/// Errors raised by catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("Product not found.")]
    NotFound { product_id: ProductId },

    #[error("Category not found.")]
    CategoryNotFound { slug: String },

    #[error("Category {category_id} does not exist.")]
    UnknownCategory { category_id: CategoryId },

    #[error("Insufficient stock quantity.")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("Quantity must be a positive integer.")]
    InvalidQuantity,

    #[error("Stock quantity of product {product_id} would overflow.")]
    StockOverflow { product_id: ProductId },

    #[error("{0}")]
    Validation(String),

    #[error("{kind} with this name already exists.")]
    DuplicateName { kind: &'static str },
}

impl ProductError {
    /// Returns true for errors about a record that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ProductError::NotFound { .. } | ProductError::CategoryNotFound { .. }
        )
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else {
            ApiError::BadRequest(err.to_string())
        }
    }
}
