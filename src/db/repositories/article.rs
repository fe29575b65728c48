//! News article repository
//!
//! The repository owns identifier and timestamp assignment: `create` generates
//! a UUID and a `created_at` that never precedes the newest stored article, so
//! listing by `created_at` always matches creation order. Ties are broken by
//! the internal `seq` column.
//!
//! Writes are single statements. SQLite then takes the write lock up front and
//! waits out the busy timeout, instead of failing a read-to-write upgrade
//! when two writers overlap.

use crate::db::DbPool;
use crate::models::{Article, CreateArticleInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

const ARTICLE_COLUMNS: &str =
    "id, title, content, image_path, video_url, tags, is_featured, created_at";

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a new article referencing an already stored image
    async fn create(&self, input: &CreateArticleInput, image_path: &str) -> Result<Article>;

    /// Get an article by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Article>>;

    /// List all articles, newest first
    async fn list(&self) -> Result<Vec<Article>>;

    /// List featured articles, newest first
    async fn list_featured(&self) -> Result<Vec<Article>>;

    /// Overwrite the mutable fields of an article; `None` if it no longer exists
    async fn update(&self, article: &Article) -> Result<Option<Article>>;

    /// Remove an article, returning the removed record
    async fn delete(&self, id: &str) -> Result<Option<Article>>;
}

/// SQLite-backed article repository
pub struct SqlxArticleRepository {
    pool: DbPool,
}

impl SqlxArticleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, input: &CreateArticleInput, image_path: &str) -> Result<Article> {
        let mut article = Article {
            id: Uuid::new_v4().to_string(),
            title: input.title.clone(),
            content: input.content.clone(),
            image_path: image_path.to_string(),
            video_url: input.video_url.clone(),
            tags: input.tags.clone(),
            is_featured: input.is_featured,
            created_at: Utc::now(),
        };

        // created_at is stored as RFC3339 text in UTC, so MAX orders it chronologically
        let row = sqlx::query(
            r#"
            INSERT INTO news_articles (id, title, content, image_path, video_url, tags, is_featured, created_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, MAX(?, COALESCE((SELECT MAX(created_at) FROM news_articles), ''))
            RETURNING created_at
            "#,
        )
        .bind(&article.id)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.image_path)
        .bind(&article.video_url)
        .bind(encode_tags(&article.tags)?)
        .bind(article.is_featured)
        .bind(article.created_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create article")?;

        article.created_at = row.try_get("created_at").context("Failed to decode article timestamp")?;
        Ok(article)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM news_articles WHERE id = ?",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get article")?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn list(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM news_articles ORDER BY created_at DESC, seq DESC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn list_featured(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM news_articles WHERE is_featured = 1 ORDER BY created_at DESC, seq DESC",
            ARTICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list featured articles")?;

        rows.iter().map(row_to_article).collect()
    }

    async fn update(&self, article: &Article) -> Result<Option<Article>> {
        let result = sqlx::query(
            "UPDATE news_articles SET title = ?, content = ?, image_path = ?, video_url = ?, tags = ?, is_featured = ? WHERE id = ?",
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.image_path)
        .bind(&article.video_url)
        .bind(encode_tags(&article.tags)?)
        .bind(article.is_featured)
        .bind(&article.id)
        .execute(&self.pool)
        .await
        .context("Failed to update article")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(&article.id).await
    }

    async fn delete(&self, id: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "DELETE FROM news_articles WHERE id = ? RETURNING {}",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to delete article")?;

        row.as_ref().map(row_to_article).transpose()
    }
}

fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).context("Failed to encode article tags")
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let tags_json: String = row.try_get("tags")?;
    let tags = serde_json::from_str(&tags_json).context("Failed to decode article tags")?;

    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        image_path: row.try_get("image_path")?,
        video_url: row.try_get("video_url")?,
        tags,
        is_featured: row.try_get("is_featured")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::{create_pool, create_test_pool, migrations};
    use std::collections::HashSet;

    async fn setup_test_repo() -> SqlxArticleRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxArticleRepository::new(pool)
    }

    fn create_test_input(title: &str) -> CreateArticleInput {
        CreateArticleInput::new(title, format!("Content for {}", title))
            .with_tags(vec!["news".to_string(), "web3".to_string()])
    }

    #[tokio::test]
    async fn test_create_article() {
        let repo = setup_test_repo().await;
        let before = Utc::now();

        let created = repo
            .create(&create_test_input("Launch"), "/uploads/launch.png")
            .await
            .expect("Failed to create article");

        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(created.title, "Launch");
        assert_eq!(created.image_path, "/uploads/launch.png");
        assert_eq!(created.tags, vec!["news", "web3"]);
        assert!(!created.is_featured);
        assert!(created.created_at >= before);
    }

    #[tokio::test]
    async fn test_get_article_by_id_roundtrips_fields() {
        let repo = setup_test_repo().await;
        let input = create_test_input("Video")
            .with_video_url("https://youtu.be/abc")
            .featured(true);
        let created = repo.create(&input, "/uploads/v.png").await.unwrap();

        let found = repo
            .get_by_id(&created.id)
            .await
            .expect("Failed to get article")
            .expect("Article not found");

        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_get_missing_article_returns_none() {
        let repo = setup_test_repo().await;
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let repo = setup_test_repo().await;
        let a = repo.create(&create_test_input("A"), "/uploads/a.png").await.unwrap();
        let b = repo.create(&create_test_input("B"), "/uploads/b.png").await.unwrap();
        let c = repo.create(&create_test_input("C"), "/uploads/c.png").await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![c.id.clone(), b.id.clone(), a.id.clone()]);
        assert!(c.created_at >= b.created_at && b.created_at >= a.created_at);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let repo = setup_test_repo().await;
        let mut ids = std::collections::HashSet::new();
        for i in 0..20 {
            let article = repo
                .create(&create_test_input(&format!("T{}", i)), "/uploads/x.png")
                .await
                .unwrap();
            assert!(ids.insert(article.id));
        }
    }

    #[tokio::test]
    async fn test_list_featured_filters() {
        let repo = setup_test_repo().await;
        repo.create(&create_test_input("Plain"), "/uploads/p.png").await.unwrap();
        let featured = repo
            .create(&create_test_input("Star").featured(true), "/uploads/s.png")
            .await
            .unwrap();

        let listed = repo.list_featured().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, featured.id);
    }

    #[tokio::test]
    async fn test_update_article() {
        let repo = setup_test_repo().await;
        let mut article = repo.create(&create_test_input("Old"), "/uploads/o.png").await.unwrap();

        article.title = "New".to_string();
        article.tags = vec![];
        let updated = repo.update(&article).await.unwrap().expect("Article not found");

        assert_eq!(updated.title, "New");
        assert!(updated.tags.is_empty());
        assert_eq!(updated.created_at, article.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_article_returns_none() {
        let repo = setup_test_repo().await;
        let mut ghost = repo.create(&create_test_input("Ghost"), "/uploads/g.png").await.unwrap();
        ghost.id = "missing".to_string();
        assert!(repo.update(&ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_article() {
        let repo = setup_test_repo().await;
        let article = repo.create(&create_test_input("Bye"), "/uploads/bye.png").await.unwrap();

        let removed = repo.delete(&article.id).await.unwrap().expect("Article not found");
        assert_eq!(removed.image_path, "/uploads/bye.png");
        assert!(repo.get_by_id(&article.id).await.unwrap().is_none());
        assert!(repo.delete(&article.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_created_at_never_precedes_newest_article() {
        let repo = setup_test_repo().await;
        let future = Utc::now() + chrono::Duration::hours(1);
        sqlx::query(
            "INSERT INTO news_articles (id, title, content, image_path, tags, is_featured, created_at) VALUES ('future', 'F', 'C', '/uploads/f.png', '[]', 0, ?)",
        )
        .bind(future)
        .execute(&repo.pool)
        .await
        .unwrap();

        let created = repo.create(&create_test_input("Later"), "/uploads/l.png").await.unwrap();

        assert_eq!(created.created_at, future);
        let stored = repo.get_by_id(&created.id).await.unwrap().expect("Article not found");
        assert_eq!(stored, created);
        assert_eq!(repo.list().await.unwrap()[0].id, created.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_on_file_database() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig {
            url: dir.path().join("site.db").to_string_lossy().to_string(),
        };
        let pool = create_pool(&config).await.expect("Failed to create pool");
        migrations::run_migrations(&pool).await.unwrap();
        let repo = SqlxArticleRepository::boxed(pool);

        let mut handles = Vec::new();
        for i in 0..40 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(&create_test_input(&format!("Post {}", i)), "/uploads/p.png")
                    .await
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            let article = handle.await.unwrap().expect("Concurrent create failed");
            assert!(ids.insert(article.id));
        }

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 40);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
