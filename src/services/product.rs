//! Product service

use crate::db::repositories::ProductRepository;
use crate::models::{CreateProductInput, Product, UpdateProductInput};
use std::sync::Arc;

/// Error types for product service operations
#[derive(Debug, thiserror::Error)]
pub enum ProductServiceError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] anyhow::Error),
}

pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Product>, ProductServiceError> {
        Ok(self.repo.list().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Product, ProductServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ProductServiceError::NotFound(id.to_string()))
    }

    pub async fn create(&self, input: CreateProductInput) -> Result<Product, ProductServiceError> {
        validate_name(&input.name)?;
        let product = self.repo.create(input).await?;
        tracing::info!("Created product {} ({})", product.id, product.name);
        Ok(product)
    }

    /// Merge the present fields into the stored product
    pub async fn update(&self, id: &str, input: UpdateProductInput) -> Result<Product, ProductServiceError> {
        if let Some(name) = &input.name {
            validate_name(name)?;
        }

        let mut product = self.get(id).await?;
        if !input.has_changes() {
            return Ok(product);
        }
        input.apply_to(&mut product);

        let updated = self
            .repo
            .update(&product)
            .await?
            .ok_or_else(|| ProductServiceError::NotFound(id.to_string()))?;
        tracing::info!("Updated product {}", updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ProductServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ProductServiceError::NotFound(id.to_string()));
        }
        tracing::info!("Deleted product {}", id);
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ProductServiceError> {
    if name.trim().is_empty() {
        return Err(ProductServiceError::ValidationError("name is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxProductRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_service() -> ProductService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        ProductService::new(SqlxProductRepository::boxed(pool))
    }

    fn named(name: &str) -> CreateProductInput {
        CreateProductInput {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let service = setup_service().await;
        assert!(matches!(
            service.create(named(" ")).await,
            Err(ProductServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let service = setup_service().await;
        let product = service.create(named("TK Token")).await.unwrap();

        let patch = UpdateProductInput {
            category: Some("Web3".to_string()),
            ..Default::default()
        };
        let updated = service.update(&product.id, patch).await.unwrap();

        assert_eq!(updated.name, "TK Token");
        assert_eq!(updated.category, "Web3");
        assert_eq!(updated.created_at, product.created_at);
    }

    #[tokio::test]
    async fn test_update_unknown_product() {
        let service = setup_service().await;
        assert!(matches!(
            service.update("missing", UpdateProductInput::default()).await,
            Err(ProductServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let service = setup_service().await;
        let product = service.create(named("Gone")).await.unwrap();

        service.delete(&product.id).await.unwrap();
        assert!(matches!(service.get(&product.id).await, Err(ProductServiceError::NotFound(_))));
        assert!(matches!(service.delete(&product.id).await, Err(ProductServiceError::NotFound(_))));
    }
}
