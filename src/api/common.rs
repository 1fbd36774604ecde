//! Shared API request/response types
//!
//! Pagination query parameters and the view models reused across endpoints.

use serde::{Deserialize, Serialize};

use crate::models::{ListParams, Recipe, User};

/// Query parameters for paginated list endpoints.
///
/// `limit` overrides the configured default page size.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    /// Resolve against the configured default page size.
    pub fn to_params(&self, default_page_size: u32) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.limit.unwrap_or(default_page_size))
    }
}

/// User view with the viewer-relative subscription flag.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserResponse {
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// The minimal recipe projection used in toggle responses.
#[derive(Debug, Serialize)]
pub struct ReducedRecipeResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

impl From<Recipe> for ReducedRecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Paginated list envelope.
#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub results: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery::default();
        let params = query.to_params(6);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 6);
    }

    #[test]
    fn test_page_query_limit_overrides_default() {
        let query = PageQuery {
            page: Some(2),
            limit: Some(20),
        };
        let params = query.to_params(6);
        assert_eq!(params.page, 2);
        assert_eq!(params.per_page, 20);
    }
}
