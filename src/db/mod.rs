//! Database layer
//!
//! This module provides database access for the Forkful recipe backend:
//! - SQLite pool construction (single-binary deployment)
//! - Code-embedded migrations run at startup
//! - Repository traits and sqlx implementations
//!
//! # Usage
//!
//! ```ignore
//! use forkful::config::DatabaseConfig;
//! use forkful::db::{create_pool, migrations};
//!
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
