//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod article;
pub mod product;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use product::{ProductRepository, SqlxProductRepository};
