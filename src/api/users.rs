//! User API endpoints
//!
//! - POST /api/users/ - registration
//! - GET /api/users/ - paginated user listing
//! - GET /api/users/me/ - current user
//! - GET /api/users/{id}/ - user profile
//! - POST|DELETE /api/users/{id}/subscribe/ - subscription toggle
//! - GET /api/users/subscriptions/ - followed authors with their recipes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::common::{PagedResponse, PageQuery, ReducedRecipeResponse, UserResponse};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, Viewer};
use crate::models::User;
use crate::services::RegisterInput;

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Query parameters for the subscriptions listing
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Cap on the recipes embedded per author; must be a positive integer
    pub recipes_limit: Option<String>,
}

/// Author view annotated with their recipes and recipe count
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<ReducedRecipeResponse>,
    pub recipes_count: i64,
}

/// Parse `recipes_limit`: absent is fine, anything else must be a positive
/// integer.
fn parse_recipes_limit(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ApiError::validation_error(
            "recipes_limit must be a positive integer",
        )),
    }
}

/// Assemble an author view with embedded recipes.
async fn build_subscription_response(
    state: &AppState,
    author: User,
    viewer: &User,
    recipes_limit: Option<i64>,
) -> Result<SubscriptionResponse, ApiError> {
    let is_subscribed = state
        .relation_service
        .is_subscribed(Some(viewer), author.id)
        .await?;
    let recipes = state
        .recipe_service
        .list_by_author(author.id, recipes_limit)
        .await?;
    let recipes_count = state.recipe_service.count_by_author(author.id).await?;

    Ok(SubscriptionResponse {
        user: UserResponse::new(author, is_subscribed),
        recipes: recipes.into_iter().map(Into::into).collect(),
        recipes_count,
    })
}

/// POST /api/users/ - register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .user_service
        .register(RegisterInput {
            username: body.username,
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            password: body.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::new(user, false))))
}

/// GET /api/users/ - paginated user listing
pub async fn list_users(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResponse<UserResponse>>, ApiError> {
    let params = query.to_params(state.page_size);
    let page = state.user_service.list(&params).await?;

    let mut results = Vec::with_capacity(page.items.len());
    for user in &page.items {
        let is_subscribed = state
            .relation_service
            .is_subscribed(viewer.as_user(), user.id)
            .await?;
        results.push(UserResponse::new(user.clone(), is_subscribed));
    }

    let total_pages = page.total_pages();
    Ok(Json(PagedResponse {
        results,
        total: page.total,
        page: page.page,
        page_size: page.per_page,
        total_pages,
    }))
}

/// GET /api/users/me/ - current user
pub async fn me(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(UserResponse::new(user.0, false))
}

/// GET /api/users/{id}/ - user profile
pub async fn get_user(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;

    let is_subscribed = state
        .relation_service
        .is_subscribed(viewer.as_user(), user.id)
        .await?;

    Ok(Json(UserResponse::new(user, is_subscribed)))
}

/// POST /api/users/{id}/subscribe/ - follow an author
pub async fn subscribe(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref())?;
    let author = state.relation_service.subscribe(&user.0, id).await?;

    let response = build_subscription_response(&state, author, &user.0, recipes_limit).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/users/{id}/subscribe/ - unfollow an author
pub async fn unsubscribe(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.relation_service.unsubscribe(&user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/subscriptions/ - authors the caller follows
pub async fn subscriptions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<Json<PagedResponse<SubscriptionResponse>>, ApiError> {
    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref())?;
    let params = crate::models::ListParams::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(state.page_size),
    );

    let page = state.relation_service.subscriptions(&user.0, &params).await?;

    let mut results = Vec::with_capacity(page.items.len());
    for author in &page.items {
        results.push(
            build_subscription_response(&state, author.clone(), &user.0, recipes_limit).await?,
        );
    }

    let total_pages = page.total_pages();
    Ok(Json(PagedResponse {
        results,
        total: page.total,
        page: page.page,
        page_size: page.per_page,
        total_pages,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipes_limit() {
        assert_eq!(parse_recipes_limit(None).unwrap(), None);
        assert_eq!(parse_recipes_limit(Some("3")).unwrap(), Some(3));

        for bad in ["0", "-1", "abc", "1.5", ""] {
            assert!(parse_recipes_limit(Some(bad)).is_err(), "{} should fail", bad);
        }
    }
}
