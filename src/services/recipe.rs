//! Recipe service
//!
//! Implements the recipe mutation rules:
//! - field and bounds validation before any write
//! - duplicate ingredient entries rejected before they can surface as a
//!   storage constraint failure
//! - every referenced ingredient and tag must exist
//! - author-or-admin authorization on update and delete
//! - create and update persist the recipe row together with the full
//!   replacement of its ingredient lines and tag links in one transaction

use crate::db::repositories::{IngredientRepository, RecipeRepository, TagRepository};
use crate::models::{
    IngredientLine, ListParams, PagedResult, Recipe, RecipeFilters, RecipePayload, RecipeWrite,
    Tag, User,
};
use anyhow::Context;
use std::collections::HashSet;
use std::sync::Arc;

use super::{MediaStore, ServiceError};

/// Inclusive cooking time bounds, in minutes
pub const MIN_COOKING_TIME: i64 = 1;
pub const MAX_COOKING_TIME: i64 = 32_000;

/// Inclusive ingredient amount bounds
pub const MIN_AMOUNT: i64 = 1;
pub const MAX_AMOUNT: i64 = 32_000;

/// Recipe service for publishing and maintaining recipes.
pub struct RecipeService {
    repo: Arc<dyn RecipeRepository>,
    ingredient_repo: Arc<dyn IngredientRepository>,
    tag_repo: Arc<dyn TagRepository>,
    media: MediaStore,
}

impl RecipeService {
    pub fn new(
        repo: Arc<dyn RecipeRepository>,
        ingredient_repo: Arc<dyn IngredientRepository>,
        tag_repo: Arc<dyn TagRepository>,
        media: MediaStore,
    ) -> Self {
        Self {
            repo,
            ingredient_repo,
            tag_repo,
            media,
        }
    }

    /// Create a recipe owned by `author`.
    ///
    /// # Errors
    /// - `Validation` for empty fields, out-of-bounds values or duplicate
    ///   ingredient entries in the payload
    /// - `NotFound` when a referenced ingredient or tag does not exist
    pub async fn create(
        &self,
        author: &User,
        payload: RecipePayload,
    ) -> Result<Recipe, ServiceError> {
        self.validate_payload(&payload).await?;

        let image = self.resolve_image(&payload.image).await?;
        let write = to_write(payload, image);

        let recipe = self
            .repo
            .create(author.id, &write)
            .await
            .context("Failed to create recipe")?;

        tracing::info!(recipe_id = recipe.id, author_id = author.id, "recipe created");
        Ok(recipe)
    }

    /// Update a recipe, wholesale-replacing its ingredient and tag sets.
    ///
    /// # Errors
    /// - `NotFound` when the recipe does not exist
    /// - `Permission` unless `requester` is the author or an admin
    /// - the same validation errors as [`Self::create`]
    pub async fn update(
        &self,
        id: i64,
        requester: &User,
        payload: RecipePayload,
    ) -> Result<Recipe, ServiceError> {
        let existing = self.get(id).await?;

        if !requester.can_edit(existing.author_id) {
            return Err(ServiceError::Permission(
                "Only the author or an admin may edit a recipe".into(),
            ));
        }

        self.validate_payload(&payload).await?;

        let image = self.resolve_image(&payload.image).await?;
        let write = to_write(payload, image);

        let updated = self
            .repo
            .update(id, &write)
            .await
            .context("Failed to update recipe")?;

        tracing::info!(recipe_id = id, requester_id = requester.id, "recipe updated");
        Ok(updated)
    }

    /// Delete a recipe. Ingredient lines, tag links, favorites and cart
    /// entries cascade.
    pub async fn delete(&self, id: i64, requester: &User) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        if !requester.can_edit(existing.author_id) {
            return Err(ServiceError::Permission(
                "Only the author or an admin may delete a recipe".into(),
            ));
        }

        self.repo.delete(id).await.context("Failed to delete recipe")?;
        tracing::info!(recipe_id = id, requester_id = requester.id, "recipe deleted");
        Ok(())
    }

    /// Get a recipe by ID.
    pub async fn get(&self, id: i64) -> Result<Recipe, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get recipe")?
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", id)))
    }

    /// List recipes matching the filters, paginated, ordered by name.
    pub async fn list(
        &self,
        filters: &RecipeFilters,
        params: &ListParams,
    ) -> Result<PagedResult<Recipe>, ServiceError> {
        let recipes = self
            .repo
            .list(filters, params.offset(), params.limit())
            .await
            .context("Failed to list recipes")?;
        let total = self
            .repo
            .count(filters)
            .await
            .context("Failed to count recipes")?;

        Ok(PagedResult::new(recipes, total, params))
    }

    /// An author's recipes ordered by id, optionally capped.
    pub async fn list_by_author(
        &self,
        author_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, ServiceError> {
        Ok(self
            .repo
            .list_by_author(author_id, limit)
            .await
            .context("Failed to list author recipes")?)
    }

    /// Count an author's recipes.
    pub async fn count_by_author(&self, author_id: i64) -> Result<i64, ServiceError> {
        Ok(self
            .repo
            .count_by_author(author_id)
            .await
            .context("Failed to count author recipes")?)
    }

    /// The ingredient lines of a recipe.
    pub async fn ingredient_lines(&self, recipe_id: i64) -> Result<Vec<IngredientLine>, ServiceError> {
        Ok(self
            .repo
            .lines_for_recipe(recipe_id)
            .await
            .context("Failed to get ingredient lines")?)
    }

    /// The tags attached to a recipe.
    pub async fn tags(&self, recipe_id: i64) -> Result<Vec<Tag>, ServiceError> {
        Ok(self
            .tag_repo
            .get_for_recipe(recipe_id)
            .await
            .context("Failed to get recipe tags")?)
    }

    /// Validate a payload: fields, bounds, duplicates and referenced IDs.
    /// Runs before any write so a failing request leaves no partial state.
    async fn validate_payload(&self, payload: &RecipePayload) -> Result<(), ServiceError> {
        if payload.name.trim().is_empty() {
            return Err(ServiceError::Validation("Recipe name cannot be empty".into()));
        }
        if payload.text.trim().is_empty() {
            return Err(ServiceError::Validation("Recipe text cannot be empty".into()));
        }
        if payload.image.trim().is_empty() {
            return Err(ServiceError::Validation("Recipe image is required".into()));
        }

        if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&payload.cooking_time) {
            return Err(ServiceError::Validation(format!(
                "cooking_time must be between {} and {}",
                MIN_COOKING_TIME, MAX_COOKING_TIME
            )));
        }

        if payload.ingredients.is_empty() {
            return Err(ServiceError::Validation(
                "A recipe needs at least one ingredient".into(),
            ));
        }
        if payload.tags.is_empty() {
            return Err(ServiceError::Validation(
                "A recipe needs at least one tag".into(),
            ));
        }

        let mut seen = HashSet::new();
        for line in &payload.ingredients {
            if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&line.amount) {
                return Err(ServiceError::Validation(format!(
                    "amount must be between {} and {}",
                    MIN_AMOUNT, MAX_AMOUNT
                )));
            }
            if !seen.insert(line.id) {
                return Err(ServiceError::Validation(format!(
                    "Ingredient {} is listed twice",
                    line.id
                )));
            }
        }

        let mut tag_seen = HashSet::new();
        for tag_id in &payload.tags {
            if !tag_seen.insert(*tag_id) {
                return Err(ServiceError::Validation(format!(
                    "Tag {} is listed twice",
                    tag_id
                )));
            }
        }

        // Every referenced ingredient must exist in the catalog
        let ingredient_ids: Vec<i64> = payload.ingredients.iter().map(|l| l.id).collect();
        let found = self
            .ingredient_repo
            .get_by_ids(&ingredient_ids)
            .await
            .context("Failed to resolve ingredients")?;
        if found.len() != ingredient_ids.len() {
            let found_ids: HashSet<i64> = found.iter().map(|i| i.id).collect();
            let missing: Vec<String> = ingredient_ids
                .iter()
                .filter(|id| !found_ids.contains(id))
                .map(|id| id.to_string())
                .collect();
            return Err(ServiceError::NotFound(format!(
                "Unknown ingredient id(s): {}",
                missing.join(", ")
            )));
        }

        // And every referenced tag
        let found_tags = self
            .tag_repo
            .get_by_ids(&payload.tags)
            .await
            .context("Failed to resolve tags")?;
        if found_tags.len() != payload.tags.len() {
            let found_ids: HashSet<i64> = found_tags.iter().map(|t| t.id).collect();
            let missing: Vec<String> = payload
                .tags
                .iter()
                .filter(|id| !found_ids.contains(id))
                .map(|id| id.to_string())
                .collect();
            return Err(ServiceError::NotFound(format!(
                "Unknown tag id(s): {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    /// Resolve the payload image to a stored URL.
    ///
    /// Fresh uploads arrive as a data URI and are written to the media
    /// store; anything else is taken as an already-stored URL (clients echo
    /// the current URL back on update).
    async fn resolve_image(&self, image: &str) -> Result<String, ServiceError> {
        if image.starts_with("data:") {
            self.media.store_data_uri(image).await
        } else {
            Ok(image.to_string())
        }
    }
}

fn to_write(payload: RecipePayload, image: String) -> RecipeWrite {
    RecipeWrite {
        name: payload.name,
        text: payload.text,
        image,
        cooking_time: payload.cooking_time,
        tag_ids: payload.tags,
        ingredients: payload.ingredients,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use crate::db::repositories::{
        SqlxIngredientRepository, SqlxRecipeRepository, SqlxTagRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Ingredient, IngredientAmount, UserRole};
    use sqlx::SqlitePool;

    struct Fixture {
        service: RecipeService,
        author: User,
        other: User,
        admin: User,
        salt_id: i64,
        sugar_id: i64,
        tag_id: i64,
        _media_dir: tempfile::TempDir,
    }

    async fn make_user(pool: &SqlitePool, username: &str, role: UserRole) -> User {
        let id = sqlx::query(
            "INSERT INTO users (username, email, password_hash, role) VALUES (?, ?, 'h', ?)",
        )
        .bind(username)
        .bind(format!("{}@example.com", username))
        .bind(role.to_string())
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid();

        let mut user = User::new(
            username.to_string(),
            format!("{}@example.com", username),
            "Test".to_string(),
            "User".to_string(),
            "h".to_string(),
            role,
        );
        user.id = id;
        user
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let ingredient_repo = SqlxIngredientRepository::boxed(pool.clone());
        let tag_repo = SqlxTagRepository::boxed(pool.clone());

        ingredient_repo
            .insert(&Ingredient::new("Salt".to_string(), "g".to_string()))
            .await
            .unwrap();
        ingredient_repo
            .insert(&Ingredient::new("Sugar".to_string(), "g".to_string()))
            .await
            .unwrap();
        let catalog = ingredient_repo.get_by_ids(&[1, 2]).await.unwrap();
        let (salt_id, sugar_id) = (catalog[0].id, catalog[1].id);

        let tag = tag_repo
            .create(&Tag::new(
                "Dinner".to_string(),
                "#49B64E".to_string(),
                "dinner".to_string(),
            ))
            .await
            .unwrap();

        let author = make_user(&pool, "chef", UserRole::User).await;
        let other = make_user(&pool, "guest", UserRole::User).await;
        let admin = make_user(&pool, "admin", UserRole::Admin).await;

        let media_dir = tempfile::tempdir().expect("Failed to create media dir");
        let media = MediaStore::new(&MediaConfig {
            path: media_dir.path().to_path_buf(),
            max_image_size: 1024 * 1024,
        });

        let service = RecipeService::new(
            SqlxRecipeRepository::boxed(pool.clone()),
            ingredient_repo,
            tag_repo,
            media,
        );

        Fixture {
            service,
            author,
            other,
            admin,
            salt_id,
            sugar_id,
            tag_id: tag.id,
            _media_dir: media_dir,
        }
    }

    fn payload(f: &Fixture) -> RecipePayload {
        RecipePayload {
            name: "Soup".to_string(),
            text: "Boil water, add salt".to_string(),
            cooking_time: 20,
            image: "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==".to_string(),
            tags: vec![f.tag_id],
            ingredients: vec![IngredientAmount { id: f.salt_id, amount: 5 }],
        }
    }

    #[tokio::test]
    async fn test_create_roundtrip_matches_payload() {
        let f = setup().await;
        let mut input = payload(&f);
        input.ingredients = vec![
            IngredientAmount { id: f.salt_id, amount: 5 },
            IngredientAmount { id: f.sugar_id, amount: 3 },
        ];

        let recipe = f.service.create(&f.author, input).await.expect("create");
        assert_eq!(recipe.author_id, f.author.id);
        assert!(recipe.image.starts_with("/media/recipes/"));

        let lines = f.service.ingredient_lines(recipe.id).await.unwrap();
        let mut pairs: Vec<(i64, i64)> =
            lines.iter().map(|l| (l.ingredient_id, l.amount)).collect();
        pairs.sort();
        assert_eq!(pairs, vec![(f.salt_id, 5), (f.sugar_id, 3)]);

        let tags = f.service.tags(recipe.id).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, f.tag_id);
    }

    #[tokio::test]
    async fn test_cooking_time_bounds() {
        let f = setup().await;

        for (value, ok) in [
            (0, false),
            (MIN_COOKING_TIME, true),
            (MAX_COOKING_TIME, true),
            (MAX_COOKING_TIME + 1, false),
        ] {
            let mut input = payload(&f);
            input.cooking_time = value;
            let result = f.service.create(&f.author, input).await;
            if ok {
                assert!(result.is_ok(), "cooking_time {} should pass", value);
            } else {
                assert!(
                    matches!(result, Err(ServiceError::Validation(_))),
                    "cooking_time {} should fail",
                    value
                );
            }
        }
    }

    #[tokio::test]
    async fn test_amount_bounds() {
        let f = setup().await;

        for (value, ok) in [(0, false), (MIN_AMOUNT, true), (MAX_AMOUNT, true), (MAX_AMOUNT + 1, false)] {
            let mut input = payload(&f);
            input.ingredients = vec![IngredientAmount { id: f.salt_id, amount: value }];
            let result = f.service.create(&f.author, input).await;
            if ok {
                assert!(result.is_ok(), "amount {} should pass", value);
            } else {
                assert!(
                    matches!(result, Err(ServiceError::Validation(_))),
                    "amount {} should fail",
                    value
                );
            }
        }
    }

    #[tokio::test]
    async fn test_duplicate_ingredient_entries_rejected() {
        let f = setup().await;
        let mut input = payload(&f);
        input.ingredients = vec![
            IngredientAmount { id: f.salt_id, amount: 5 },
            IngredientAmount { id: f.salt_id, amount: 3 },
        ];

        let result = f.service.create(&f.author, input).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_ingredient_is_not_found() {
        let f = setup().await;
        let mut input = payload(&f);
        input.ingredients = vec![IngredientAmount { id: 9999, amount: 5 }];

        let result = f.service.create(&f.author, input).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_tag_is_not_found() {
        let f = setup().await;
        let mut input = payload(&f);
        input.tags = vec![9999];

        let result = f.service.create(&f.author, input).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let f = setup().await;

        let mut input = payload(&f);
        input.name = "   ".to_string();
        assert!(matches!(
            f.service.create(&f.author, input).await,
            Err(ServiceError::Validation(_))
        ));

        let mut input = payload(&f);
        input.ingredients.clear();
        assert!(matches!(
            f.service.create(&f.author, input).await,
            Err(ServiceError::Validation(_))
        ));

        let mut input = payload(&f);
        input.tags.clear();
        assert!(matches!(
            f.service.create(&f.author, input).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_sets_exactly() {
        let f = setup().await;
        let recipe = f.service.create(&f.author, payload(&f)).await.unwrap();

        let mut next = payload(&f);
        next.name = "Sweet Soup".to_string();
        next.image = recipe.image.clone(); // echo the stored URL back
        next.ingredients = vec![IngredientAmount { id: f.sugar_id, amount: 7 }];

        let updated = f.service.update(recipe.id, &f.author, next).await.unwrap();
        assert_eq!(updated.name, "Sweet Soup");
        assert_eq!(updated.image, recipe.image);

        // No residual lines from the prior version
        let lines = f.service.ingredient_lines(recipe.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].ingredient_id, f.sugar_id);
        assert_eq!(lines[0].amount, 7);
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let f = setup().await;
        let recipe = f.service.create(&f.author, payload(&f)).await.unwrap();

        let result = f.service.update(recipe.id, &f.other, payload(&f)).await;
        assert!(matches!(result, Err(ServiceError::Permission(_))));
    }

    #[tokio::test]
    async fn test_admin_may_update_and_delete() {
        let f = setup().await;
        let recipe = f.service.create(&f.author, payload(&f)).await.unwrap();

        let mut next = payload(&f);
        next.name = "Admin edit".to_string();
        f.service
            .update(recipe.id, &f.admin, next)
            .await
            .expect("Admin update should succeed");

        f.service
            .delete(recipe.id, &f.admin)
            .await
            .expect("Admin delete should succeed");
        assert!(matches!(
            f.service.get(recipe.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden() {
        let f = setup().await;
        let recipe = f.service.create(&f.author, payload(&f)).await.unwrap();

        let result = f.service.delete(recipe.id, &f.other).await;
        assert!(matches!(result, Err(ServiceError::Permission(_))));
        assert!(f.service.get(recipe.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_recipe_is_not_found() {
        let f = setup().await;
        let result = f.service.update(404, &f.author, payload(&f)).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_validation_leaves_no_partial_state() {
        let f = setup().await;

        // Unknown tag: validation fails after the ingredient check, before
        // any write
        let mut input = payload(&f);
        input.tags = vec![9999];
        let _ = f.service.create(&f.author, input).await;

        let listed = f
            .service
            .list(&RecipeFilters::default(), &ListParams::default())
            .await
            .unwrap();
        assert!(listed.is_empty());
    }
}
