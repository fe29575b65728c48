//! News API endpoints
//!
//! - GET /api/news[?featured=true]
//! - POST /api/news (multipart, admin)
//! - GET /api/news/{id}
//! - PUT /api/news/{id} (multipart, admin)
//! - DELETE /api/news/{id} (admin)
//!
//! Create and update read these multipart fields: `title`, `content`,
//! `imagePath` (the image file), `tags` (comma-separated), `videoUrl` and
//! `isFeatured` (`"true"` or anything else). Unknown fields are ignored.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{AdminSession, ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::{parse_tags, Article, CreateArticleInput, UpdateArticleInput};
use crate::services::ImageUpload;

/// Query parameters for listing news
#[derive(Debug, Deserialize)]
pub struct ListNewsQuery {
    pub featured: Option<String>,
}

/// Build the news router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/news", get(list_news).post(create_news))
        .route("/news/{id}", get(get_news).put(update_news).delete(delete_news))
}

/// Fields collected from a news multipart form
#[derive(Debug, Default)]
struct NewsForm {
    title: Option<String>,
    content: Option<String>,
    tags: Option<String>,
    video_url: Option<String>,
    is_featured: Option<String>,
    image: Option<ImageUpload>,
}

impl NewsForm {
    async fn parse(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::validation_error(format!("Failed to read multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == "imagePath" {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation_error(format!("Failed to read file: {}", e)))?;

                // Browsers send an empty part when no file was chosen
                if !data.is_empty() {
                    form.image = Some(ImageUpload::new(data.to_vec(), file_name, content_type));
                }
                continue;
            }

            let slot = match name.as_str() {
                "title" => &mut form.title,
                "content" => &mut form.content,
                "tags" => &mut form.tags,
                "videoUrl" => &mut form.video_url,
                "isFeatured" => &mut form.is_featured,
                _ => continue,
            };
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::validation_error(format!("Failed to read field {}: {}", name, e)))?;
            *slot = Some(text);
        }

        Ok(form)
    }

    fn into_create(self) -> (CreateArticleInput, Option<ImageUpload>) {
        let input = CreateArticleInput {
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            video_url: self.video_url.and_then(non_empty),
            tags: self.tags.as_deref().map(parse_tags).unwrap_or_default(),
            is_featured: self.is_featured.as_deref() == Some("true"),
        };
        (input, self.image)
    }

    fn into_update(self) -> (UpdateArticleInput, Option<ImageUpload>) {
        let input = UpdateArticleInput {
            title: self.title,
            content: self.content,
            video_url: self.video_url.map(non_empty),
            tags: self.tags.as_deref().map(parse_tags),
            is_featured: self.is_featured.map(|v| v == "true"),
        };
        (input, self.image)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// GET /api/news
async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<ListNewsQuery>,
) -> Result<Json<ApiResponse<Vec<Article>>>, ApiError> {
    let articles = if query.featured.as_deref() == Some("true") {
        state.article_service.list_featured().await?
    } else {
        state.article_service.list().await?
    };
    Ok(ApiResponse::ok(articles))
}

/// GET /api/news/{id}
async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let article = state.article_service.get(&id).await?;
    Ok(ApiResponse::ok(article))
}

/// POST /api/news
async fn create_news(
    State(state): State<AppState>,
    _admin: AdminSession,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (input, image) = NewsForm::parse(multipart).await?.into_create();
    let article = state.article_service.create(input, image).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(article)))
}

/// PUT /api/news/{id}
async fn update_news(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let (input, image) = NewsForm::parse(multipart).await?.into_update();
    let article = state.article_service.update(&id, input, image).await?;
    Ok(ApiResponse::ok(article))
}

/// DELETE /api/news/{id}
async fn delete_news(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.article_service.delete(&id).await?;
    Ok(ApiResponse::done())
}
