//! Products API endpoints
//!
//! - GET /api/products
//! - POST /api/products (admin)
//! - GET /api/products/{id}
//! - PUT /api/products/{id} (admin)
//! - DELETE /api/products/{id} (admin)

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{AdminSession, ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::{CreateProductInput, Product, UpdateProductInput};

/// Build the products router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::validation_error(e.body_text()))
}

/// GET /api/products
async fn list_products(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    Ok(ApiResponse::ok(state.product_service.list().await?))
}

/// GET /api/products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    Ok(ApiResponse::ok(state.product_service.get(&id).await?))
}

/// POST /api/products
async fn create_product(
    State(state): State<AppState>,
    _admin: AdminSession,
    payload: Result<Json<CreateProductInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.product_service.create(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(product)))
}

/// PUT /api/products/{id}
async fn update_product(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductInput>, JsonRejection>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state.product_service.update(&id, json_body(payload)?).await?;
    Ok(ApiResponse::ok(product))
}

/// DELETE /api/products/{id}
async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.product_service.delete(&id).await?;
    Ok(ApiResponse::done())
}
