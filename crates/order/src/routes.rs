//! Order HTTP handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use clients::UserDirectory;
use common::{Capability, Identity, OrderId};
use serde::Serialize;
use service_kit::{ApiError, Bearer, authorize_request};

use crate::coordinator::OrderSagaCoordinator;
use crate::error::OrderError;
use crate::models::{CreateOrderRequest, OrderStatistics, OrderView, UpdateStatusRequest};
use crate::state::OrderStatus;

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderSagaCoordinator,
    pub users: Arc<dyn UserDirectory>,
}

impl AppState {
    async fn caller(&self, bearer: &Bearer, capability: Capability) -> Result<Identity, ApiError> {
        authorize_request(self.users.as_ref(), &bearer.0, capability).await
    }
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub order: OrderView,
}

/// GET /api/orders/
pub async fn list_orders(
    State(state): State<AppState>,
    bearer: Bearer,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let identity = state.caller(&bearer, Capability::ViewOrders).await?;
    let orders = state.orders.list_orders(identity.user_id).await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// GET /api/orders/{id}/
pub async fn get_order(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderView>, ApiError> {
    let identity = state.caller(&bearer, Capability::ViewOrders).await?;
    let order = state.orders.get_order(identity.user_id, order_id).await?;
    Ok(Json(order.into()))
}

/// POST /api/orders/create/
pub async fn create_order(
    State(state): State<AppState>,
    bearer: Bearer,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let identity = state.caller(&bearer, Capability::PlaceOrder).await?;
    tracing::info!(user_id = %identity.user_id, "create order request received");

    let order = state
        .orders
        .create_order(identity.user_id, &bearer.0, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Order created successfully.",
            order: order.into(),
        }),
    ))
}

/// PUT /api/orders/{id}/status/
pub async fn update_status(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(order_id): Path<OrderId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderView>, ApiError> {
    state.caller(&bearer, Capability::ManageOrderStatus).await?;
    let status: OrderStatus = request.status.parse().map_err(OrderError::from)?;

    let order = state.orders.update_order_status(order_id, status).await?;
    Ok(Json(order.into()))
}

/// GET /api/orders/statistics/
pub async fn statistics(
    State(state): State<AppState>,
    bearer: Bearer,
) -> Result<Json<OrderStatistics>, ApiError> {
    let identity = state.caller(&bearer, Capability::ViewOrders).await?;
    Ok(Json(state.orders.statistics(identity.user_id).await?))
}
