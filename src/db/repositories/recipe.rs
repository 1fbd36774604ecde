//! Recipe repository
//!
//! Database operations for recipes and the join rows they own (tag links and
//! ingredient lines). Create and update run in a single transaction: the
//! recipe row and the full replacement of its associations land together or
//! not at all, so concurrent readers never observe a recipe with a partial
//! ingredient set.

use crate::models::{IngredientLine, Recipe, RecipeFilters, RecipeWrite};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Recipe repository trait
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Create a recipe with its tag links and ingredient lines, atomically.
    async fn create(&self, author_id: i64, write: &RecipeWrite) -> Result<Recipe>;

    /// Update a recipe's fields and wholesale-replace its tag links and
    /// ingredient lines, atomically.
    async fn update(&self, id: i64, write: &RecipeWrite) -> Result<Recipe>;

    /// Delete a recipe (join rows, favorites and cart entries cascade).
    async fn delete(&self, id: i64) -> Result<()>;

    /// Get recipe by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Recipe>>;

    /// List recipes matching the filters, ordered by name
    async fn list(&self, filters: &RecipeFilters, offset: i64, limit: i64)
        -> Result<Vec<Recipe>>;

    /// Count recipes matching the filters
    async fn count(&self, filters: &RecipeFilters) -> Result<i64>;

    /// List an author's recipes ordered by id, optionally capped
    async fn list_by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>>;

    /// Count an author's recipes
    async fn count_by_author(&self, author_id: i64) -> Result<i64>;

    /// Get the ingredient lines of a recipe, with catalog name and unit
    async fn lines_for_recipe(&self, recipe_id: i64) -> Result<Vec<IngredientLine>>;
}

/// SQLx-based recipe repository implementation
pub struct SqlxRecipeRepository {
    pool: SqlitePool,
}

impl SqlxRecipeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: SqlitePool) -> Arc<dyn RecipeRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl RecipeRepository for SqlxRecipeRepository {
    async fn create(&self, author_id: i64, write: &RecipeWrite) -> Result<Recipe> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let result = sqlx::query(
            r#"
            INSERT INTO recipes (author_id, name, text, image, cooking_time, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(author_id)
        .bind(&write.name)
        .bind(&write.text)
        .bind(&write.image)
        .bind(write.cooking_time)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Failed to create recipe")?;

        let id = result.last_insert_rowid();

        insert_joins(&mut tx, id, write).await?;

        tx.commit().await.context("Failed to commit recipe create")?;

        Ok(Recipe {
            id,
            author_id,
            name: write.name.clone(),
            text: write.text.clone(),
            image: write.image.clone(),
            cooking_time: write.cooking_time,
            created_at: now,
        })
    }

    async fn update(&self, id: i64, write: &RecipeWrite) -> Result<Recipe> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            "UPDATE recipes SET name = ?, text = ?, image = ?, cooking_time = ? WHERE id = ?",
        )
        .bind(&write.name)
        .bind(&write.text)
        .bind(&write.image)
        .bind(write.cooking_time)
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to update recipe")?;

        // Full replace: clear both association sets, then re-insert from the
        // payload. Runs in the same transaction as the field update.
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear ingredient lines")?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear tag links")?;

        insert_joins(&mut tx, id, write).await?;

        tx.commit().await.context("Failed to commit recipe update")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Recipe not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete recipe")?;

        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Recipe>> {
        let row = sqlx::query(
            "SELECT id, author_id, name, text, image, cooking_time, created_at FROM recipes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get recipe by ID")?;

        Ok(row.map(|row| row_to_recipe(&row)))
    }

    async fn list(
        &self,
        filters: &RecipeFilters,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Recipe>> {
        let (sql, binds) = build_list_query(
            "SELECT DISTINCT r.id, r.author_id, r.name, r.text, r.image, r.cooking_time, r.created_at",
            filters,
            true,
        );

        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = match bind {
                ListBind::Int(v) => query.bind(v),
                ListBind::Text(v) => query.bind(v),
            };
        }
        query = query.bind(limit).bind(offset);

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list recipes")?;

        Ok(rows.iter().map(row_to_recipe).collect())
    }

    async fn count(&self, filters: &RecipeFilters) -> Result<i64> {
        let (sql, binds) =
            build_list_query("SELECT COUNT(DISTINCT r.id) as count", filters, false);

        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = match bind {
                ListBind::Int(v) => query.bind(v),
                ListBind::Text(v) => query.bind(v),
            };
        }

        let row = query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count recipes")?;

        Ok(row.get("count"))
    }

    async fn list_by_author(&self, author_id: i64, limit: Option<i64>) -> Result<Vec<Recipe>> {
        let base = "SELECT id, author_id, name, text, image, cooking_time, created_at FROM recipes WHERE author_id = ? ORDER BY id";
        let rows = match limit {
            Some(limit) => {
                sqlx::query(&format!("{} LIMIT ?", base))
                    .bind(author_id)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => sqlx::query(base).bind(author_id).fetch_all(&self.pool).await,
        }
        .context("Failed to list recipes by author")?;

        Ok(rows.iter().map(row_to_recipe).collect())
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM recipes WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count recipes by author")?;

        Ok(row.get("count"))
    }

    async fn lines_for_recipe(&self, recipe_id: i64) -> Result<Vec<IngredientLine>> {
        let rows = sqlx::query(
            r#"
            SELECT ri.ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            INNER JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ?
            ORDER BY ri.id
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get ingredient lines")?;

        Ok(rows.iter().map(row_to_line).collect())
    }
}

/// Insert the tag links and ingredient lines of a write inside `tx`.
async fn insert_joins(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    recipe_id: i64,
    write: &RecipeWrite,
) -> Result<()> {
    for tag_id in &write.tag_ids {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await
            .context("Failed to attach tag")?;
    }

    for line in &write.ingredients {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
        )
        .bind(recipe_id)
        .bind(line.id)
        .bind(line.amount)
        .execute(&mut **tx)
        .await
        .context("Failed to attach ingredient line")?;
    }

    Ok(())
}

/// A deferred bind value for the dynamically assembled list query.
enum ListBind {
    Int(i64),
    Text(String),
}

/// Assemble the recipe list/count SQL for the given filters.
///
/// Returns the SQL and the binds in placeholder order; the caller appends
/// LIMIT/OFFSET binds when `paged` is true.
fn build_list_query(select: &str, filters: &RecipeFilters, paged: bool) -> (String, Vec<ListBind>) {
    let mut sql = format!("{} FROM recipes r", select);
    let mut binds = Vec::new();

    if !filters.tag_slugs.is_empty() {
        sql.push_str(
            " INNER JOIN recipe_tags rt ON rt.recipe_id = r.id INNER JOIN tags t ON t.id = rt.tag_id",
        );
    }
    if filters.favorited_by.is_some() {
        sql.push_str(" INNER JOIN favorites f ON f.recipe_id = r.id");
    }
    if filters.in_cart_of.is_some() {
        sql.push_str(" INNER JOIN cart_entries c ON c.recipe_id = r.id");
    }

    sql.push_str(" WHERE 1 = 1");

    if let Some(author_id) = filters.author_id {
        sql.push_str(" AND r.author_id = ?");
        binds.push(ListBind::Int(author_id));
    }
    if !filters.tag_slugs.is_empty() {
        let placeholders = vec!["?"; filters.tag_slugs.len()].join(", ");
        sql.push_str(&format!(" AND t.slug IN ({})", placeholders));
        for slug in &filters.tag_slugs {
            binds.push(ListBind::Text(slug.clone()));
        }
    }
    if let Some(user_id) = filters.favorited_by {
        sql.push_str(" AND f.user_id = ?");
        binds.push(ListBind::Int(user_id));
    }
    if let Some(user_id) = filters.in_cart_of {
        sql.push_str(" AND c.user_id = ?");
        binds.push(ListBind::Int(user_id));
    }

    if paged {
        sql.push_str(" ORDER BY r.name, r.id LIMIT ? OFFSET ?");
    }

    (sql, binds)
}

fn row_to_recipe(row: &sqlx::sqlite::SqliteRow) -> Recipe {
    Recipe {
        id: row.get("id"),
        author_id: row.get("author_id"),
        name: row.get("name"),
        text: row.get("text"),
        image: row.get("image"),
        cooking_time: row.get("cooking_time"),
        created_at: row.get("created_at"),
    }
}

fn row_to_line(row: &sqlx::sqlite::SqliteRow) -> IngredientLine {
    IngredientLine {
        ingredient_id: row.get("ingredient_id"),
        name: row.get("name"),
        measurement_unit: row.get("measurement_unit"),
        amount: row.get("amount"),
    }
}
