//! API layer - HTTP handlers and routing
//!
//! This module contains the HTTP surface of the content backend:
//! - Auth API endpoints (admin login/logout/session)
//! - News API endpoints
//! - Products API endpoints
//! - Health check
//! - Static file serving from the public directory, behind the admin page gate

pub mod auth;
pub mod health;
pub mod middleware;
pub mod news;
pub mod products;
pub mod responses;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::UploadConfig;

pub use middleware::{AdminSession, ApiError, AppState};
pub use responses::ApiResponse;

/// Room for the text fields sent next to an image
const FORM_FIELDS_ALLOWANCE: usize = 1024 * 1024;

/// Build the `/api` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(news::router())
        .merge(products::router())
}

/// Request body limit: the largest allowed image plus the form fields
fn body_limit(config: &UploadConfig) -> usize {
    usize::try_from(config.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_FIELDS_ALLOWANCE)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    // Cookie-based auth needs credentials allowed
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::COOKIE])
        .allow_credentials(true);

    let body_limit = body_limit(&state.upload_config);
    let public_dir = ServeDir::new(&state.upload_config.public_dir);

    Ok(Router::new()
        .nest("/api", build_api_router())
        .route("/health", get(health::health))
        .fallback_service(public_dir)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::admin_page_guard,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
