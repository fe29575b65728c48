//! Product repository

use crate::db::DbPool;
use crate::models::{CreateProductInput, Product};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, category, description, long_description, image, features, tech_stack, video_url, created_at";

/// Product repository trait
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: CreateProductInput) -> Result<Product>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Product>>;
    /// List all products, newest first
    async fn list(&self) -> Result<Vec<Product>>;
    async fn update(&self, product: &Product) -> Result<Option<Product>>;
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// SQLite-backed product repository
pub struct SqlxProductRepository {
    pool: DbPool,
}

impl SqlxProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn ProductRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ProductRepository for SqlxProductRepository {
    async fn create(&self, input: CreateProductInput) -> Result<Product> {
        let mut product = input.into_product(Uuid::new_v4().to_string(), Utc::now());

        // Same clamp as articles: one statement, no read-then-write upgrade
        let row = sqlx::query(
            r#"
            INSERT INTO products (id, name, category, description, long_description, image, features, tech_stack, video_url, created_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, MAX(?, COALESCE((SELECT MAX(created_at) FROM products), ''))
            RETURNING created_at
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.long_description)
        .bind(&product.image)
        .bind(encode_list(&product.features)?)
        .bind(encode_list(&product.tech_stack)?)
        .bind(&product.video_url)
        .bind(product.created_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create product")?;

        product.created_at = row.try_get("created_at").context("Failed to decode product timestamp")?;
        Ok(product)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get product")?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM products ORDER BY created_at DESC, seq DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list products")?;

        rows.iter().map(row_to_product).collect()
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>> {
        let result = sqlx::query(
            "UPDATE products SET name = ?, category = ?, description = ?, long_description = ?, image = ?, features = ?, tech_stack = ?, video_url = ? WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.description)
        .bind(&product.long_description)
        .bind(&product.image)
        .bind(encode_list(&product.features)?)
        .bind(encode_list(&product.tech_stack)?)
        .bind(&product.video_url)
        .bind(&product.id)
        .execute(&self.pool)
        .await
        .context("Failed to update product")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(&product.id).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete product")?;

        Ok(result.rows_affected() > 0)
    }
}

fn encode_list(values: &[String]) -> Result<String> {
    serde_json::to_string(values).context("Failed to encode product list")
}

fn decode_list(row: &SqliteRow, column: &str) -> Result<Vec<String>> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to decode product {}", column))
}

fn row_to_product(row: &SqliteRow) -> Result<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        description: row.try_get("description")?,
        long_description: row.try_get("long_description")?,
        image: row.try_get("image")?,
        features: decode_list(row, "features")?,
        tech_stack: decode_list(row, "tech_stack")?,
        video_url: row.try_get("video_url")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::{create_pool, create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxProductRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxProductRepository::new(pool)
    }

    fn create_test_input(name: &str) -> CreateProductInput {
        CreateProductInput {
            name: name.to_string(),
            category: "Web3".to_string(),
            features: vec!["Staking".to_string(), "Bridge".to_string()],
            tech_stack: vec!["Rust".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let repo = setup_test_repo().await;
        let created = repo.create(create_test_input("TK Token")).await.unwrap();

        assert!(Uuid::parse_str(&created.id).is_ok());
        let found = repo.get_by_id(&created.id).await.unwrap().expect("Product not found");
        assert_eq!(found, created);
        assert_eq!(found.features, vec!["Staking", "Bridge"]);
    }

    #[tokio::test]
    async fn test_list_products_newest_first() {
        let repo = setup_test_repo().await;
        let first = repo.create(create_test_input("One")).await.unwrap();
        let second = repo.create(create_test_input("Two")).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_update_product() {
        let repo = setup_test_repo().await;
        let mut product = repo.create(create_test_input("Old")).await.unwrap();

        product.name = "New".to_string();
        product.image = Some("/img/new.png".to_string());
        let updated = repo.update(&product).await.unwrap().expect("Product not found");
        assert_eq!(updated.name, "New");
        assert_eq!(updated.image.as_deref(), Some("/img/new.png"));

        product.id = "missing".to_string();
        assert!(repo.update(&product).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_product() {
        let repo = setup_test_repo().await;
        let product = repo.create(create_test_input("Gone")).await.unwrap();

        assert!(repo.delete(&product.id).await.unwrap());
        assert!(!repo.delete(&product.id).await.unwrap());
        assert!(repo.get_by_id(&product.id).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_on_file_database() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig {
            url: dir.path().join("site.db").to_string_lossy().to_string(),
        };
        let pool = create_pool(&config).await.expect("Failed to create pool");
        migrations::run_migrations(&pool).await.unwrap();
        let repo = SqlxProductRepository::boxed(pool);

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(create_test_input(&format!("P{}", i))).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().expect("Concurrent create failed");
        }

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 40);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
