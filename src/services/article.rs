//! Article service
//!
//! Implements business logic for news articles:
//! - Create, read, update, delete articles
//! - Validation of required fields
//! - Image lifecycle: the image is stored before the record is written, and
//!   replaced or deleted images are removed best-effort afterwards

use crate::db::repositories::ArticleRepository;
use crate::models::{Article, CreateArticleInput, UpdateArticleInput};
use crate::services::upload::{ImageStorage, ImageUpload, UploadError};
use std::sync::Arc;

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// Article not found
    #[error("Article not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Repository or filesystem failure
    #[error("Storage error: {0}")]
    StorageError(#[from] anyhow::Error),
}

impl From<UploadError> for ArticleServiceError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Storage(e) => Self::StorageError(e),
            other => Self::ValidationError(other.to_string()),
        }
    }
}

/// Article service for managing news articles
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
    images: Arc<dyn ImageStorage>,
}

impl ArticleService {
    pub fn new(repo: Arc<dyn ArticleRepository>, images: Arc<dyn ImageStorage>) -> Self {
        Self { repo, images }
    }

    /// All articles, newest first
    pub async fn list(&self) -> Result<Vec<Article>, ArticleServiceError> {
        Ok(self.repo.list().await?)
    }

    /// Featured articles, newest first
    pub async fn list_featured(&self) -> Result<Vec<Article>, ArticleServiceError> {
        Ok(self.repo.list_featured().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Article, ArticleServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ArticleServiceError::NotFound(id.to_string()))
    }

    /// Create an article. The image is required.
    pub async fn create(
        &self,
        input: CreateArticleInput,
        image: Option<ImageUpload>,
    ) -> Result<Article, ArticleServiceError> {
        validate_required("title", &input.title)?;
        validate_required("content", &input.content)?;
        let image = image.ok_or_else(|| ArticleServiceError::ValidationError("Image is required".to_string()))?;

        let image_path = self.images.store(&image).await?;

        match self.repo.create(&input, &image_path).await {
            Ok(article) => {
                tracing::info!("Created article {} ({})", article.id, article.title);
                Ok(article)
            }
            Err(e) => {
                self.discard_image(&image_path).await;
                Err(e.into())
            }
        }
    }

    /// Patch an article; only provided fields change.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateArticleInput,
        image: Option<ImageUpload>,
    ) -> Result<Article, ArticleServiceError> {
        if let Some(title) = &input.title {
            validate_required("title", title)?;
        }
        if let Some(content) = &input.content {
            validate_required("content", content)?;
        }

        let mut article = self.get(id).await?;
        if !input.has_changes() && image.is_none() {
            return Ok(article);
        }
        input.apply_to(&mut article);

        let old_image = article.image_path.clone();
        let new_image = match image {
            Some(upload) => Some(self.images.store(&upload).await?),
            None => None,
        };
        if let Some(path) = &new_image {
            article.image_path = path.clone();
        }

        let result = match self.repo.update(&article).await {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(ArticleServiceError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        };

        match (&result, &new_image) {
            // The record now points at the new file
            (Ok(_), Some(_)) => self.discard_image(&old_image).await,
            (Err(_), Some(path)) => self.discard_image(path).await,
            _ => {}
        }

        if let Ok(updated) = &result {
            tracing::info!("Updated article {}", updated.id);
        }
        result
    }

    /// Delete an article and its image
    pub async fn delete(&self, id: &str) -> Result<(), ArticleServiceError> {
        let article = self
            .repo
            .delete(id)
            .await?
            .ok_or_else(|| ArticleServiceError::NotFound(id.to_string()))?;

        self.discard_image(&article.image_path).await;
        tracing::info!("Deleted article {}", id);
        Ok(())
    }

    async fn discard_image(&self, reference: &str) {
        if let Err(e) = self.images.delete(reference).await {
            tracing::warn!("Failed to delete image {}: {:#}", reference, e);
        }
    }
}

fn validate_required(field: &str, value: &str) -> Result<(), ArticleServiceError> {
    if value.trim().is_empty() {
        return Err(ArticleServiceError::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}
