//! Database connection pool
//!
//! SQLite pool construction for the Forkful recipe backend. The service is a
//! single-binary deployment backed by one SQLite file; foreign keys are
//! enabled on every pool so cascade deletes of recipes, favorites and cart
//! entries behave as the schema declares.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DatabaseConfig;

/// Create a SQLite connection pool from configuration.
///
/// Accepts either a plain file path, a `sqlite:` URL, or `:memory:`. For
/// file-backed databases the parent directory is created if missing and the
/// connection runs in `rwc` mode so the file is created on first start.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let url = &config.url;

    // Ensure the database directory exists for file-based SQLite
    if !url.starts_with(":memory:") && !url.starts_with("sqlite::memory:") {
        let path = if url.starts_with("sqlite:") {
            url.trim_start_matches("sqlite:")
        } else {
            url
        };

        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }
    }

    let connection_url = if url.starts_with("sqlite:") {
        if url.contains('?') {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}?mode=rwc", url)
    };

    // foreign_keys is a per-connection pragma; set it via connect options so
    // every pooled connection enforces the schema's cascades.
    let options = SqliteConnectOptions::from_str(&connection_url)
        .with_context(|| format!("Invalid SQLite connection URL: {}", connection_url))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    Ok(pool)
}

/// Create a SQLite in-memory database pool for testing.
///
/// Capped at one connection: every pooled connection to `:memory:` opens its
/// own blank database, so a single shared connection is the only way all
/// test queries observe the same schema.
pub async fn create_test_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("Failed to create in-memory test database")?;

    Ok(pool)
}
