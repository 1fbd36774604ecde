//! Relationship service
//!
//! Toggle semantics over the three unique-pair relationships: favorites,
//! cart entries and subscriptions. Adding an existing pair is a conflict,
//! removing an absent pair is not found, and self-subscription is rejected
//! before any write. The repositories translate duplicate-key failures from
//! the unique constraints, so two concurrent adds can never both succeed.

use crate::db::repositories::{
    CartRepository, FavoriteRepository, RecipeRepository, SubscriptionRepository, UserRepository,
};
use crate::models::{ListParams, PagedResult, Recipe, User};
use anyhow::Context;
use std::sync::Arc;

use super::ServiceError;

/// Service guarding favorite, cart and subscription pairs.
pub struct RelationService {
    favorite_repo: Arc<dyn FavoriteRepository>,
    cart_repo: Arc<dyn CartRepository>,
    subscription_repo: Arc<dyn SubscriptionRepository>,
    recipe_repo: Arc<dyn RecipeRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl RelationService {
    pub fn new(
        favorite_repo: Arc<dyn FavoriteRepository>,
        cart_repo: Arc<dyn CartRepository>,
        subscription_repo: Arc<dyn SubscriptionRepository>,
        recipe_repo: Arc<dyn RecipeRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            favorite_repo,
            cart_repo,
            subscription_repo,
            recipe_repo,
            user_repo,
        }
    }

    async fn recipe_or_not_found(&self, recipe_id: i64) -> Result<Recipe, ServiceError> {
        self.recipe_repo
            .get_by_id(recipe_id)
            .await
            .context("Failed to get recipe")?
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", recipe_id)))
    }

    /// Favorite a recipe. Returns the recipe for the reduced response view.
    pub async fn add_favorite(&self, user: &User, recipe_id: i64) -> Result<Recipe, ServiceError> {
        let recipe = self.recipe_or_not_found(recipe_id).await?;

        let added = self
            .favorite_repo
            .add(user.id, recipe_id)
            .await
            .context("Failed to add favorite")?;
        if !added {
            return Err(ServiceError::Conflict(
                "Recipe is already in favorites".into(),
            ));
        }
        Ok(recipe)
    }

    /// Remove a favorite.
    pub async fn remove_favorite(&self, user: &User, recipe_id: i64) -> Result<(), ServiceError> {
        self.recipe_or_not_found(recipe_id).await?;

        let removed = self
            .favorite_repo
            .remove(user.id, recipe_id)
            .await
            .context("Failed to remove favorite")?;
        if !removed {
            return Err(ServiceError::NotFound("Recipe is not in favorites".into()));
        }
        Ok(())
    }

    /// Put a recipe into the user's shopping cart.
    pub async fn add_to_cart(&self, user: &User, recipe_id: i64) -> Result<Recipe, ServiceError> {
        let recipe = self.recipe_or_not_found(recipe_id).await?;

        let added = self
            .cart_repo
            .add(user.id, recipe_id)
            .await
            .context("Failed to add cart entry")?;
        if !added {
            return Err(ServiceError::Conflict(
                "Recipe is already in the shopping cart".into(),
            ));
        }
        Ok(recipe)
    }

    /// Remove a recipe from the user's shopping cart.
    pub async fn remove_from_cart(&self, user: &User, recipe_id: i64) -> Result<(), ServiceError> {
        self.recipe_or_not_found(recipe_id).await?;

        let removed = self
            .cart_repo
            .remove(user.id, recipe_id)
            .await
            .context("Failed to remove cart entry")?;
        if !removed {
            return Err(ServiceError::NotFound(
                "Recipe is not in the shopping cart".into(),
            ));
        }
        Ok(())
    }

    /// Follow an author. Returns the author for the response view.
    pub async fn subscribe(&self, user: &User, author_id: i64) -> Result<User, ServiceError> {
        let author = self
            .user_repo
            .get_by_id(author_id)
            .await
            .context("Failed to get author")?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", author_id)))?;

        if user.id == author_id {
            return Err(ServiceError::Validation(
                "Subscribing to yourself is not allowed".into(),
            ));
        }

        let added = self
            .subscription_repo
            .add(user.id, author_id)
            .await
            .context("Failed to add subscription")?;
        if !added {
            return Err(ServiceError::Conflict(
                "Already subscribed to this author".into(),
            ));
        }
        Ok(author)
    }

    /// Unfollow an author.
    pub async fn unsubscribe(&self, user: &User, author_id: i64) -> Result<(), ServiceError> {
        self.user_repo
            .get_by_id(author_id)
            .await
            .context("Failed to get author")?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", author_id)))?;

        let removed = self
            .subscription_repo
            .remove(user.id, author_id)
            .await
            .context("Failed to remove subscription")?;
        if !removed {
            return Err(ServiceError::NotFound(
                "Not subscribed to this author".into(),
            ));
        }
        Ok(())
    }

    /// Authors the user follows, paginated.
    pub async fn subscriptions(
        &self,
        user: &User,
        params: &ListParams,
    ) -> Result<PagedResult<User>, ServiceError> {
        let authors = self
            .subscription_repo
            .authors_followed_by(user.id, params.offset(), params.limit())
            .await
            .context("Failed to list subscriptions")?;
        let total = self
            .subscription_repo
            .count_followed_by(user.id)
            .await
            .context("Failed to count subscriptions")?;

        Ok(PagedResult::new(authors, total, params))
    }

    /// Whether `viewer` has favorited the recipe. Anonymous viewers get false.
    pub async fn is_favorited(
        &self,
        viewer: Option<&User>,
        recipe_id: i64,
    ) -> Result<bool, ServiceError> {
        match viewer {
            Some(user) => Ok(self
                .favorite_repo
                .exists(user.id, recipe_id)
                .await
                .context("Failed to check favorite")?),
            None => Ok(false),
        }
    }

    /// Whether the recipe is in `viewer`'s cart. Anonymous viewers get false.
    pub async fn is_in_cart(
        &self,
        viewer: Option<&User>,
        recipe_id: i64,
    ) -> Result<bool, ServiceError> {
        match viewer {
            Some(user) => Ok(self
                .cart_repo
                .exists(user.id, recipe_id)
                .await
                .context("Failed to check cart")?),
            None => Ok(false),
        }
    }

    /// Whether `viewer` follows the author. Anonymous viewers get false.
    pub async fn is_subscribed(
        &self,
        viewer: Option<&User>,
        author_id: i64,
    ) -> Result<bool, ServiceError> {
        match viewer {
            Some(user) => Ok(self
                .subscription_repo
                .exists(user.id, author_id)
                .await
                .context("Failed to check subscription")?),
            None => Ok(false),
        }
    }
}
