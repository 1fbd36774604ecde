//! Relationship repositories
//!
//! Favorites, cart entries and subscriptions are pure relationship records:
//! a unique pair of IDs with toggle semantics. Each `add` relies on the
//! table's unique constraint as the concurrency backstop: a duplicate-key
//! failure is reported as `false` rather than surfaced as a raw storage
//! error, and each `remove` reports whether a row actually existed.

use crate::models::{IngredientLine, User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// Favorite repository trait
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Insert the pair; returns false when it already exists.
    async fn add(&self, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Delete the pair; returns false when it did not exist.
    async fn remove(&self, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Check whether the pair exists.
    async fn exists(&self, user_id: i64, recipe_id: i64) -> Result<bool>;
}

/// Cart repository trait
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Insert the pair; returns false when it already exists.
    async fn add(&self, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Delete the pair; returns false when it did not exist.
    async fn remove(&self, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Check whether the pair exists.
    async fn exists(&self, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Every ingredient line of every recipe in the user's cart.
    async fn cart_lines(&self, user_id: i64) -> Result<Vec<IngredientLine>>;
}

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert the pair; returns false when it already exists.
    async fn add(&self, follower_id: i64, author_id: i64) -> Result<bool>;

    /// Delete the pair; returns false when it did not exist.
    async fn remove(&self, follower_id: i64, author_id: i64) -> Result<bool>;

    /// Check whether the pair exists.
    async fn exists(&self, follower_id: i64, author_id: i64) -> Result<bool>;

    /// Authors the user follows, paginated, ordered by subscription id.
    async fn authors_followed_by(
        &self,
        follower_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>>;

    /// Count of authors the user follows.
    async fn count_followed_by(&self, follower_id: i64) -> Result<i64>;
}

/// Run a pair insert, mapping a unique violation to `Ok(false)`.
async fn insert_pair(pool: &SqlitePool, sql: &str, left: i64, right: i64) -> Result<bool> {
    let result = sqlx::query(sql).bind(left).bind(right).execute(pool).await;

    match result {
        Ok(_) => Ok(true),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(false),
        Err(e) => Err(e).context("Failed to insert relationship pair"),
    }
}

/// Run a pair delete, reporting whether a row was removed.
async fn delete_pair(pool: &SqlitePool, sql: &str, left: i64, right: i64) -> Result<bool> {
    let result = sqlx::query(sql)
        .bind(left)
        .bind(right)
        .execute(pool)
        .await
        .context("Failed to delete relationship pair")?;

    Ok(result.rows_affected() > 0)
}

/// Run a pair existence check.
async fn pair_exists(pool: &SqlitePool, sql: &str, left: i64, right: i64) -> Result<bool> {
    let row = sqlx::query(sql)
        .bind(left)
        .bind(right)
        .fetch_one(pool)
        .await
        .context("Failed to check relationship pair")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

/// SQLx-based favorite repository implementation
pub struct SqlxFavoriteRepository {
    pool: SqlitePool,
}

impl SqlxFavoriteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn FavoriteRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl FavoriteRepository for SqlxFavoriteRepository {
    async fn add(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        insert_pair(
            &self.pool,
            "INSERT INTO favorites (user_id, recipe_id) VALUES (?, ?)",
            user_id,
            recipe_id,
        )
        .await
    }

    async fn remove(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        delete_pair(
            &self.pool,
            "DELETE FROM favorites WHERE user_id = ? AND recipe_id = ?",
            user_id,
            recipe_id,
        )
        .await
    }

    async fn exists(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        pair_exists(
            &self.pool,
            "SELECT COUNT(*) as count FROM favorites WHERE user_id = ? AND recipe_id = ?",
            user_id,
            recipe_id,
        )
        .await
    }
}

/// SQLx-based cart repository implementation
pub struct SqlxCartRepository {
    pool: SqlitePool,
}

impl SqlxCartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn CartRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CartRepository for SqlxCartRepository {
    async fn add(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        insert_pair(
            &self.pool,
            "INSERT INTO cart_entries (user_id, recipe_id) VALUES (?, ?)",
            user_id,
            recipe_id,
        )
        .await
    }

    async fn remove(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        delete_pair(
            &self.pool,
            "DELETE FROM cart_entries WHERE user_id = ? AND recipe_id = ?",
            user_id,
            recipe_id,
        )
        .await
    }

    async fn exists(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        pair_exists(
            &self.pool,
            "SELECT COUNT(*) as count FROM cart_entries WHERE user_id = ? AND recipe_id = ?",
            user_id,
            recipe_id,
        )
        .await
    }

    async fn cart_lines(&self, user_id: i64) -> Result<Vec<IngredientLine>> {
        let rows = sqlx::query(
            r#"
            SELECT ri.ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM cart_entries ce
            INNER JOIN recipe_ingredients ri ON ri.recipe_id = ce.recipe_id
            INNER JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ce.user_id = ?
            ORDER BY ri.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to collect cart ingredient lines")?;

        Ok(rows
            .iter()
            .map(|row| IngredientLine {
                ingredient_id: row.get("ingredient_id"),
                name: row.get("name"),
                measurement_unit: row.get("measurement_unit"),
                amount: row.get("amount"),
            })
            .collect())
    }
}

/// SQLx-based subscription repository implementation
pub struct SqlxSubscriptionRepository {
    pool: SqlitePool,
}

impl SqlxSubscriptionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn SubscriptionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SubscriptionRepository for SqlxSubscriptionRepository {
    async fn add(&self, follower_id: i64, author_id: i64) -> Result<bool> {
        insert_pair(
            &self.pool,
            "INSERT INTO subscriptions (follower_id, author_id) VALUES (?, ?)",
            follower_id,
            author_id,
        )
        .await
    }

    async fn remove(&self, follower_id: i64, author_id: i64) -> Result<bool> {
        delete_pair(
            &self.pool,
            "DELETE FROM subscriptions WHERE follower_id = ? AND author_id = ?",
            follower_id,
            author_id,
        )
        .await
    }

    async fn exists(&self, follower_id: i64, author_id: i64) -> Result<bool> {
        pair_exists(
            &self.pool,
            "SELECT COUNT(*) as count FROM subscriptions WHERE follower_id = ? AND author_id = ?",
            follower_id,
            author_id,
        )
        .await
    }

    async fn authors_followed_by(
        &self,
        follower_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.email, u.first_name, u.last_name,
                   u.password_hash, u.role, u.created_at
            FROM subscriptions s
            INNER JOIN users u ON u.id = s.author_id
            WHERE s.follower_id = ?
            ORDER BY s.id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(follower_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list followed authors")?;

        rows.iter()
            .map(|row| {
                let role_str: String = row.get("role");
                Ok(User {
                    id: row.get("id"),
                    username: row.get("username"),
                    email: row.get("email"),
                    first_name: row.get("first_name"),
                    last_name: row.get("last_name"),
                    password_hash: row.get("password_hash"),
                    role: UserRole::from_str(&role_str)?,
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    async fn count_followed_by(&self, follower_id: i64) -> Result<i64> {
        let row =
            sqlx::query("SELECT COUNT(*) as count FROM subscriptions WHERE follower_id = ?")
                .bind(follower_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to count followed authors")?;

        Ok(row.get("count"))
    }
}
