//! Data models
//!
//! Entities stored by the content backend and the input types used to create
//! and patch them:
//! - `Article` (news)
//! - `Product` (catalogue)

mod article;
mod product;

pub use article::{parse_tags, Article, CreateArticleInput, UpdateArticleInput};
pub use product::{CreateProductInput, Product, UpdateProductInput};
