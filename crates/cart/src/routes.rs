//! Cart HTTP handlers. Every route acts on the caller's own cart.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use clients::UserDirectory;
use common::{Capability, CartItemId, Identity};
use serde::Serialize;
use service_kit::{ApiError, Bearer, authorize_request};

use crate::models::{AddItemRequest, CartItemView, CartSummary, CartView, UpdateItemRequest};
use crate::service::CartService;

/// Shared application state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cart: CartService,
    pub users: Arc<dyn UserDirectory>,
}

impl AppState {
    async fn caller(&self, bearer: &Bearer) -> Result<Identity, ApiError> {
        authorize_request(self.users.as_ref(), &bearer.0, Capability::ManageCart).await
    }
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub message: &'static str,
    pub cart_item: CartItemView,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /api/cart/
pub async fn get_cart(
    State(state): State<AppState>,
    bearer: Bearer,
) -> Result<Json<CartView>, ApiError> {
    let identity = state.caller(&bearer).await?;
    Ok(Json(state.cart.get_cart(identity.user_id).await))
}

/// POST /api/cart/add/
pub async fn add_item(
    State(state): State<AppState>,
    bearer: Bearer,
    Json(request): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let identity = state.caller(&bearer).await?;
    let added = state
        .cart
        .add_item(identity.user_id, request.product_id, request.quantity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ItemResponse {
            message: "Product added to cart successfully.",
            cart_item: CartItemView::new(&added.item, Some(added.product_info)),
        }),
    ))
}

/// PUT /api/cart/items/{id}/
pub async fn update_item(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(item_id): Path<CartItemId>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let identity = state.caller(&bearer).await?;
    let item = state
        .cart
        .update_item(identity.user_id, item_id, request.quantity)
        .await?;

    Ok(Json(ItemResponse {
        message: "Cart item updated successfully.",
        cart_item: CartItemView::new(&item, None),
    }))
}

/// DELETE /api/cart/items/{id}/remove/
pub async fn remove_item(
    State(state): State<AppState>,
    bearer: Bearer,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = state.caller(&bearer).await?;
    state.cart.remove_item(identity.user_id, item_id).await?;
    Ok(Json(MessageResponse {
        message: "Cart item deleted successfully.",
    }))
}

/// DELETE /api/cart/clear/
pub async fn clear_cart(
    State(state): State<AppState>,
    bearer: Bearer,
) -> Result<Json<MessageResponse>, ApiError> {
    let identity = state.caller(&bearer).await?;
    state.cart.clear_cart(identity.user_id).await?;
    Ok(Json(MessageResponse {
        message: "Cart cleared successfully.",
    }))
}

/// GET /api/cart/summary/
pub async fn summary(
    State(state): State<AppState>,
    bearer: Bearer,
) -> Result<Json<CartSummary>, ApiError> {
    let identity = state.caller(&bearer).await?;
    Ok(Json(state.cart.summary(identity.user_id).await))
}
