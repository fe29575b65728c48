//! Database layer
//!
//! SQLite is the single persistence backend. Articles and products live in
//! their own tables; uploaded images stay on disk and are referenced by path.
//!
//! # Usage
//!
//! ```ignore
//! use neonecy::config::DatabaseConfig;
//! use neonecy::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, ping, DbPool};
