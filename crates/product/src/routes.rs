//! Product directory HTTP handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use clients::{Availability, StockLevel};
use common::ProductId;
use serde::{Deserialize, Serialize};
use service_kit::ApiError;

use crate::error::ProductError;
use crate::models::{Category, NewCategory, NewProduct, ProductDetail, ProductFilter, ProductUpdate};
use crate::service::ProductService;

// -- Request types --

#[derive(Debug, Default, Deserialize)]
pub struct QuantityRequest {
    pub quantity: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub search: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct StockResponse {
    pub message: &'static str,
    pub product_id: ProductId,
    pub stock_quantity: u32,
}

impl StockResponse {
    fn new(message: &'static str, level: StockLevel) -> Self {
        Self {
            message,
            product_id: level.product_id,
            stock_quantity: level.stock_quantity,
        }
    }
}

fn positive_quantity(quantity: Option<i64>) -> Result<u32, ProductError> {
    u32::try_from(quantity.unwrap_or(1))
        .ok()
        .filter(|q| *q > 0)
        .ok_or(ProductError::InvalidQuantity)
}

/// Reads `{"quantity": n}`; an empty body means one unit.
fn quantity_from_body(body: &Bytes) -> Result<u32, ProductError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(1);
    }
    let request: QuantityRequest = serde_json::from_slice(body)
        .map_err(|e| ProductError::Validation(format!("Invalid request body: {e}")))?;
    positive_quantity(request.quantity)
}

// -- Handlers --

/// GET /api/products/: list active products.
pub async fn list_products(
    State(service): State<ProductService>,
    Query(filter): Query<ProductFilter>,
) -> Json<Vec<ProductDetail>> {
    Json(service.list_products(&filter).await)
}

/// POST /api/products/: create a product.
pub async fn create_product(
    State(service): State<ProductService>,
    Json(new): Json<NewProduct>,
) -> Result<(StatusCode, Json<ProductDetail>), ApiError> {
    let detail = service.create_product(new).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/products/{id}/
pub async fn get_product(
    State(service): State<ProductService>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>, ApiError> {
    Ok(Json(service.get_product(id).await?))
}

/// PUT /api/products/{id}/: replace every editable field.
pub async fn replace_product(
    State(service): State<ProductService>,
    Path(id): Path<ProductId>,
    Json(new): Json<NewProduct>,
) -> Result<Json<ProductDetail>, ApiError> {
    Ok(Json(service.update_product(id, new.into()).await?))
}

/// PATCH /api/products/{id}/: change only the fields present.
pub async fn patch_product(
    State(service): State<ProductService>,
    Path(id): Path<ProductId>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<ProductDetail>, ApiError> {
    Ok(Json(service.update_product(id, update).await?))
}

/// DELETE /api/products/{id}/
pub async fn delete_product(
    State(service): State<ProductService>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, ApiError> {
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/products/{id}/reserve/
pub async fn reserve(
    State(service): State<ProductService>,
    Path(id): Path<ProductId>,
    body: Bytes,
) -> Result<Json<StockResponse>, ApiError> {
    let quantity = quantity_from_body(&body)?;
    let level = service.reserve(id, quantity).await?;
    Ok(Json(StockResponse::new("Product reserved successfully.", level)))
}

/// POST /api/products/{id}/release/
pub async fn release(
    State(service): State<ProductService>,
    Path(id): Path<ProductId>,
    body: Bytes,
) -> Result<Json<StockResponse>, ApiError> {
    let quantity = quantity_from_body(&body)?;
    let level = service.release(id, quantity).await?;
    Ok(Json(StockResponse::new("Product released successfully.", level)))
}

/// GET /api/products/{id}/check-availability/?quantity=N
pub async fn check_availability(
    State(service): State<ProductService>,
    Path(id): Path<ProductId>,
    Query(query): Query<QuantityRequest>,
) -> Result<Json<Availability>, ApiError> {
    let quantity = positive_quantity(query.quantity)?;
    Ok(Json(service.check_availability(id, quantity).await?))
}

/// GET /api/products/categories/?search=
pub async fn list_categories(
    State(service): State<ProductService>,
    Query(query): Query<CategoryQuery>,
) -> Json<Vec<Category>> {
    Json(service.list_categories(query.search.as_deref()).await)
}

/// POST /api/products/categories/
pub async fn create_category(
    State(service): State<ProductService>,
    Json(new): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = service.create_category(new).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/products/categories/{slug}/
pub async fn get_category(
    State(service): State<ProductService>,
    Path(slug): Path<String>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(service.get_category(&slug).await?))
}
