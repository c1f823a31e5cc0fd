//! Order error types.

use clients::ClientError;
use common::{OrderId, ProductId};
use service_kit::ApiError;
use thiserror::Error;

use crate::repository::RepositoryError;
use crate::state::{OrderStatus, UnknownStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Shipping address is required.")]
    MissingShippingAddress,

    #[error("Cart is empty.")]
    EmptyCart,

    #[error("User not found.")]
    UserNotFound,

    /// A product refused a reservation; earlier lines were released.
    #[error("Failed to reserve products.")]
    ReservationFailed { product_id: ProductId, reason: String },

    /// The order could not be written; every reservation was released.
    #[error("Error creating order.")]
    Persistence(#[source] RepositoryError),

    #[error("Order {order_id} not found.")]
    NotFound { order_id: OrderId },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),

    #[error(transparent)]
    Storage(RepositoryError),

    #[error(transparent)]
    Upstream(#[from] ClientError),
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::UserNotFound | OrderError::NotFound { .. } => {
                ApiError::NotFound(err.to_string())
            }
            OrderError::Persistence(ref source) => {
                tracing::error!(error = %source, "order persistence failed");
                ApiError::Internal(err.to_string())
            }
            OrderError::Storage(_) => ApiError::Internal(err.to_string()),
            OrderError::Upstream(e) => e.into(),
            OrderError::MissingShippingAddress
            | OrderError::EmptyCart
            | OrderError::ReservationFailed { .. }
            | OrderError::InvalidTransition { .. }
            | OrderError::UnknownStatus(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    fn status_of(err: OrderError) -> StatusCode {
        ApiError::from(err).status()
    }

    #[test]
    fn saga_failures_map_to_status_codes() {
        assert_eq!(status_of(OrderError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(OrderError::UserNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(OrderError::ReservationFailed {
                product_id: ProductId::new(1),
                reason: "Insufficient stock quantity.".to_string(),
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(OrderError::Persistence(RepositoryError::Unavailable(
                "disk full".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(OrderError::Upstream(ClientError::Transport {
                service: "cart-service",
                detail: "connection refused".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn invalid_transition_message() {
        let err = OrderError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Cancelled,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition from delivered to cancelled"
        );
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }
}
