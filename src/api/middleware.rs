//! API middleware
//!
//! Contains:
//! - Shared application state
//! - `ApiError`, the error side of the response envelope
//! - Admin session extraction for mutating API routes
//! - Admin page gating for `/admin/*`

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;

use crate::api::responses::ApiResponse;
use crate::config::{Config, UploadConfig};
use crate::db::repositories::{SqlxArticleRepository, SqlxProductRepository};
use crate::db::DbPool;
use crate::services::{
    ArticleService, ArticleServiceError, LocalImageStorage, ProductService, ProductServiceError,
    SessionService, SESSION_COOKIE,
};

/// Admin area root
pub const ADMIN_PATH: &str = "/admin";
/// Admin login page
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub article_service: Arc<ArticleService>,
    pub product_service: Arc<ProductService>,
    pub session_service: Arc<SessionService>,
    pub upload_config: Arc<UploadConfig>,
}

impl AppState {
    /// Wire repositories, image storage and services over an open pool
    pub fn new(pool: DbPool, config: &Config, session_secret: &str) -> anyhow::Result<Self> {
        let images = Arc::new(LocalImageStorage::new(&config.upload));
        let session_service = SessionService::new(&config.admin, session_secret)?;

        Ok(Self {
            article_service: Arc::new(ArticleService::new(
                SqlxArticleRepository::boxed(pool.clone()),
                images,
            )),
            product_service: Arc::new(ProductService::new(SqlxProductRepository::boxed(pool.clone()))),
            session_service: Arc::new(session_service),
            upload_config: Arc::new(config.upload.clone()),
            pool,
        })
    }

    /// Whether the request headers carry a valid admin session cookie
    pub fn is_admin(&self, headers: &HeaderMap) -> bool {
        extract_session_token(headers)
            .map(|token| self.session_service.is_authenticated(&token))
            .unwrap_or(false)
    }
}

/// Error response for API errors
#[derive(Debug)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the detail and hide it from the client
    fn storage(err: anyhow::Error) -> Self {
        tracing::error!("Storage error: {:#}", err);
        Self::internal_error("Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ApiResponse::failure(self.message))).into_response()
    }
}

impl From<ArticleServiceError> for ApiError {
    fn from(err: ArticleServiceError) -> Self {
        match err {
            ArticleServiceError::NotFound(_) => ApiError::not_found("Article not found"),
            ArticleServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ArticleServiceError::StorageError(e) => ApiError::storage(e),
        }
    }
}

impl From<ProductServiceError> for ApiError {
    fn from(err: ProductServiceError) -> Self {
        match err {
            ProductServiceError::NotFound(_) => ApiError::not_found("Product not found"),
            ProductServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ProductServiceError::StorageError(e) => ApiError::storage(e),
        }
    }
}

/// Extract the session cookie value from request headers
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| cookie.trim().strip_prefix(prefix.as_str()).map(String::from))
}

/// Proof that the request carries a valid admin session
///
/// Use as a handler argument on routes that modify content.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if state.is_admin(&parts.headers) {
            Ok(AdminSession)
        } else {
            Err(ApiError::unauthorized("Unauthorized"))
        }
    }
}

/// Reduce a request path to the file path the static service would open.
///
/// Percent-decodes, drops empty and `.` segments, applies `..` lexically and
/// lowercases. `None` when the decoded bytes are not UTF-8.
fn normalize_path(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw).ok()?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    Some(format!("/{}", segments.join("/")).to_ascii_lowercase())
}

/// Admin page gate
///
/// Anonymous requests under `/admin` are redirected to the login page, and an
/// authenticated visit to the login page goes to the admin home. The check
/// runs on the normalised path, so encoded or dotted spellings of `/admin`
/// are gated too.
pub async fn admin_page_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    // Undecodable paths are gated like admin pages
    let path = normalize_path(request.uri().path()).unwrap_or_else(|| ADMIN_PATH.to_string());

    let in_admin = path == ADMIN_PATH || path.starts_with("/admin/");
    if !in_admin {
        return next.run(request).await;
    }

    let authenticated = state.is_admin(request.headers());
    let on_login = path == ADMIN_LOGIN_PATH;

    match (on_login, authenticated) {
        (true, true) => Redirect::to(ADMIN_PATH).into_response(),
        (false, false) => {
            tracing::debug!("Redirecting anonymous request for {} to login", request.uri().path());
            Redirect::to(ADMIN_LOGIN_PATH).into_response()
        }
        _ => next.run(request).await,
    }
}
