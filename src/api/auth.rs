//! Authentication API endpoints
//!
//! - POST /api/auth/login - Admin login, sets the session cookie
//! - POST /api/auth/logout - Clears the session cookie
//! - GET /api/auth/session - Whether the caller holds an admin session

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{ApiResponse, SessionStatus};

/// Request body for admin login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Build the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
}

fn set_cookie(cookie: &str) -> Result<HeaderMap, ApiError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::internal_error(format!("Invalid cookie header: {}", e)))?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::validation_error(e.body_text()))?;

    let cookie = state
        .session_service
        .login(&body.email, &body.password)
        .map_err(|_| {
            tracing::info!("Rejected admin login attempt");
            ApiError::unauthorized("Invalid credentials")
        })?;

    tracing::info!("Admin logged in");
    Ok((set_cookie(&cookie)?, ApiResponse::done()))
}

/// POST /api/auth/logout
async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cookie = state.session_service.logout_cookie();
    Ok((set_cookie(&cookie)?, ApiResponse::done()))
}

/// GET /api/auth/session
async fn session(State(state): State<AppState>, headers: HeaderMap) -> Json<ApiResponse<SessionStatus>> {
    ApiResponse::ok(SessionStatus {
        authenticated: state.is_admin(&headers),
    })
}
