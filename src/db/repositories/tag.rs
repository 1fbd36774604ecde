//! Tag repository
//!
//! Database operations for recipe tags. Tags are reference data; recipes
//! link to them through the recipe_tags join table, which is owned by the
//! recipe repository.

use crate::models::Tag;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, tag: &Tag) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get all tags matching the given IDs
    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>>;

    /// List all tags ordered by id
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Get the tags attached to a recipe
    async fn get_for_recipe(&self, recipe_id: i64) -> Result<Vec<Tag>>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        let result = sqlx::query("INSERT INTO tags (name, color, slug) VALUES (?, ?, ?)")
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(&tag.slug)
            .execute(&self.pool)
            .await
            .context("Failed to create tag")?;

        let mut created = tag.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, color, slug FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by ID")?;

        Ok(row.map(|row| row_to_tag(&row)))
    }

    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, color, slug FROM tags WHERE id IN ({}) ORDER BY id",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to get tags by IDs")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, color, slug FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn get_for_recipe(&self, recipe_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.color, t.slug
            FROM tags t
            INNER JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = ?
            ORDER BY t.id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get tags for recipe")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        name: row.get("name"),
        color: row.get("color"),
        slug: row.get("slug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxTagRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxTagRepository::new(pool)
    }

    fn tag(name: &str, color: &str, slug: &str) -> Tag {
        Tag::new(name.to_string(), color.to_string(), slug.to_string())
    }

    #[tokio::test]
    async fn test_create_and_list_tags() {
        let repo = setup_test_repo().await;

        let breakfast = repo
            .create(&tag("Breakfast", "#E26C2D", "breakfast"))
            .await
            .expect("Failed to create tag");
        assert!(breakfast.id > 0);

        repo.create(&tag("Dinner", "#49B64E", "dinner"))
            .await
            .expect("Failed to create tag");

        let all = repo.list().await.expect("Failed to list tags");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].slug, "breakfast");
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let repo = setup_test_repo().await;
        repo.create(&tag("Breakfast", "#E26C2D", "breakfast"))
            .await
            .unwrap();

        // Duplicate name
        assert!(repo
            .create(&tag("Breakfast", "#FFFFFF", "other"))
            .await
            .is_err());
        // Duplicate color
        assert!(repo
            .create(&tag("Lunch", "#E26C2D", "lunch"))
            .await
            .is_err());
        // Duplicate slug
        assert!(repo
            .create(&tag("Brunch", "#000000", "breakfast"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_get_by_ids() {
        let repo = setup_test_repo().await;
        let a = repo.create(&tag("A", "#000001", "a")).await.unwrap();
        let _b = repo.create(&tag("B", "#000002", "b")).await.unwrap();
        let c = repo.create(&tag("C", "#000003", "c")).await.unwrap();

        let subset = repo.get_by_ids(&[a.id, c.id]).await.unwrap();
        assert_eq!(subset.len(), 2);

        assert!(repo.get_by_ids(&[]).await.unwrap().is_empty());
    }
}
