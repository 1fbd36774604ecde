//! Recipe model
//!
//! This module provides:
//! - `Recipe` entity owned by exactly one author
//! - `IngredientLine` join rows carrying per-recipe amounts
//! - `RecipePayload` input used by both create and update (update is a full
//!   replace of the ingredient and tag sets, not a merge)
//! - `RecipeFilters` for list queries
//! - Pagination types shared by all list endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recipe entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier
    pub id: i64,
    /// Author user ID
    pub author_id: i64,
    /// Recipe name
    pub name: String,
    /// Recipe body text
    pub text: String,
    /// Stored image URL
    pub image: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// One (recipe, ingredient, amount) join row, denormalized with the
/// ingredient's name and unit for view building and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    /// Ingredient ID
    pub ingredient_id: i64,
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Amount of the ingredient in this recipe
    pub amount: i64,
}

/// One `{id, amount}` entry of a recipe payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Catalog ingredient ID
    pub id: i64,
    /// Amount to attach to the recipe
    pub amount: i64,
}

/// Input for creating or updating a recipe.
///
/// The same shape serves both operations: an update wholesale-replaces the
/// recipe's ingredient lines and tag links with the supplied sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipePayload {
    /// Recipe name
    pub name: String,
    /// Recipe body text
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
    /// Image payload: a base64 data URI on input
    pub image: String,
    /// Tag IDs to attach
    pub tags: Vec<i64>,
    /// Ingredient lines to attach
    pub ingredients: Vec<IngredientAmount>,
}

/// A validated recipe write, ready for storage.
///
/// Produced by the recipe service after validation and image storage: the
/// `image` field here is the stored URL, not the inbound base64 payload.
#[derive(Debug, Clone)]
pub struct RecipeWrite {
    /// Recipe name
    pub name: String,
    /// Recipe body text
    pub text: String,
    /// Stored image URL
    pub image: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
    /// Tag IDs to attach
    pub tag_ids: Vec<i64>,
    /// Ingredient lines to attach
    pub ingredients: Vec<IngredientAmount>,
}

/// Optional filters for recipe list queries.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilters {
    /// Only recipes by this author
    pub author_id: Option<i64>,
    /// Only recipes carrying at least one of these tag slugs
    pub tag_slugs: Vec<String>,
    /// Only recipes favorited by this user
    pub favorited_by: Option<i64>,
    /// Only recipes in this user's shopping cart
    pub in_cart_of: Option<i64>,
}

impl RecipeFilters {
    pub fn is_empty(&self) -> bool {
        self.author_id.is_none()
            && self.tag_slugs.is_empty()
            && self.favorited_by.is_none()
            && self.in_cart_of.is_none()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 6,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.per_page) as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((self.total as u32) + self.per_page - 1) / self.per_page
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 6,
        }
    }
}
