//! Ingredient repository
//!
//! Database operations for the ingredient catalog. The catalog is reference
//! data: rows are only ever inserted (by the CSV seeder) and read.

use crate::models::Ingredient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Ingredient repository trait
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Insert a catalog row; returns false when the (name, unit) pair
    /// already exists.
    async fn insert(&self, ingredient: &Ingredient) -> Result<bool>;

    /// Get ingredient by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Ingredient>>;

    /// Get all ingredients matching the given IDs
    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>>;

    /// List the whole catalog ordered by id
    async fn list(&self) -> Result<Vec<Ingredient>>;

    /// Case-insensitive prefix search on the ingredient name
    async fn search_by_prefix(&self, prefix: &str) -> Result<Vec<Ingredient>>;
}

/// SQLx-based ingredient repository implementation
pub struct SqlxIngredientRepository {
    pool: SqlitePool,
}

impl SqlxIngredientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn IngredientRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl IngredientRepository for SqlxIngredientRepository {
    async fn insert(&self, ingredient: &Ingredient) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO ingredients (name, measurement_unit) VALUES (?, ?)",
        )
        .bind(&ingredient.name)
        .bind(&ingredient.measurement_unit)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(false),
            Err(e) => Err(e).context("Failed to insert ingredient"),
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Ingredient>> {
        let row = sqlx::query(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get ingredient by ID")?;

        Ok(row.map(|row| row_to_ingredient(&row)))
    }

    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id IN ({}) ORDER BY id",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to get ingredients by IDs")?;

        Ok(rows.iter().map(row_to_ingredient).collect())
    }

    async fn list(&self) -> Result<Vec<Ingredient>> {
        let rows = sqlx::query(
            "SELECT id, name, measurement_unit FROM ingredients ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list ingredients")?;

        Ok(rows.iter().map(row_to_ingredient).collect())
    }

    async fn search_by_prefix(&self, prefix: &str) -> Result<Vec<Ingredient>> {
        let pattern = format!("{}%", prefix.to_lowercase());
        let rows = sqlx::query(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE lower(name) LIKE ?
            ORDER BY name, id
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .context("Failed to search ingredients")?;

        Ok(rows.iter().map(row_to_ingredient).collect())
    }
}

fn row_to_ingredient(row: &sqlx::sqlite::SqliteRow) -> Ingredient {
    Ingredient {
        id: row.get("id"),
        name: row.get("name"),
        measurement_unit: row.get("measurement_unit"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxIngredientRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxIngredientRepository::new(pool)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = setup_test_repo().await;

        let inserted = repo
            .insert(&Ingredient::new("Salt".to_string(), "g".to_string()))
            .await
            .expect("Failed to insert");
        assert!(inserted);

        let all = repo.list().await.expect("Failed to list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Salt");

        let found = repo
            .get_by_id(all[0].id)
            .await
            .expect("Failed to get")
            .expect("Ingredient not found");
        assert_eq!(found.measurement_unit, "g");
    }

    #[tokio::test]
    async fn test_insert_duplicate_pair_is_skipped() {
        let repo = setup_test_repo().await;

        assert!(repo
            .insert(&Ingredient::new("Salt".to_string(), "g".to_string()))
            .await
            .unwrap());
        // Same pair: reported as not inserted, no error
        assert!(!repo
            .insert(&Ingredient::new("Salt".to_string(), "g".to_string()))
            .await
            .unwrap());
        // Same name, different unit: a new catalog row
        assert!(repo
            .insert(&Ingredient::new("Salt".to_string(), "pinch".to_string()))
            .await
            .unwrap());

        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_ids() {
        let repo = setup_test_repo().await;
        for name in ["Salt", "Sugar", "Flour"] {
            repo.insert(&Ingredient::new(name.to_string(), "g".to_string()))
                .await
                .unwrap();
        }
        let all = repo.list().await.unwrap();

        let subset = repo
            .get_by_ids(&[all[0].id, all[2].id])
            .await
            .expect("Failed to get by IDs");
        assert_eq!(subset.len(), 2);

        let empty = repo.get_by_ids(&[]).await.unwrap();
        assert!(empty.is_empty());

        let missing = repo.get_by_ids(&[9999]).await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_search_by_prefix_case_insensitive() {
        let repo = setup_test_repo().await;
        for (name, unit) in [("Cabbage", "g"), ("Carrot", "g"), ("Salt", "g")] {
            repo.insert(&Ingredient::new(name.to_string(), unit.to_string()))
                .await
                .unwrap();
        }

        let results = repo.search_by_prefix("ca").await.expect("Search failed");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Cabbage");
        assert_eq!(results[1].name, "Carrot");

        // Prefix match only, not substring
        let results = repo.search_by_prefix("arr").await.unwrap();
        assert!(results.is_empty());

        let results = repo.search_by_prefix("SALT").await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
