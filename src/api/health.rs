//! Health check endpoint

use axum::{extract::State, Json};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{ApiResponse, HealthStatus};
use crate::db;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Result<Json<ApiResponse<HealthStatus>>, ApiError> {
    db::ping(&state.pool).await.map_err(|e| {
        tracing::error!("Health check failed: {:#}", e);
        ApiError::internal_error("Database unavailable")
    })?;

    Ok(ApiResponse::ok(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
