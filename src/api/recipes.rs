//! Recipe API endpoints
//!
//! Handles HTTP requests for recipes and the relationships hanging off
//! them:
//! - GET /api/recipes/ - paginated, filterable listing
//! - GET /api/recipes/{id}/ - recipe detail
//! - POST /api/recipes/ - create (auth)
//! - PATCH /api/recipes/{id}/ - update (author or admin)
//! - DELETE /api/recipes/{id}/ - delete (author or admin)
//! - POST|DELETE /api/recipes/{id}/favorite/ - favorite toggle
//! - POST|DELETE /api/recipes/{id}/shopping_cart/ - cart toggle
//! - GET /api/recipes/download_shopping_cart/ - shopping list download

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::common::{PagedResponse, ReducedRecipeResponse, UserResponse};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, Viewer};
use crate::models::{Recipe, RecipeFilters, RecipePayload};

/// Query parameters for the recipe listing
#[derive(Debug, Default, Deserialize)]
pub struct ListRecipesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Filter by author ID
    pub author: Option<i64>,
    /// Comma-separated tag slugs
    pub tags: Option<String>,
    /// Only recipes the viewer has favorited
    #[serde(default)]
    pub is_favorited: Option<u8>,
    /// Only recipes in the viewer's cart
    #[serde(default)]
    pub is_in_shopping_cart: Option<u8>,
}

/// Ingredient line in a recipe view
#[derive(Debug, Serialize)]
pub struct IngredientLineResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Tag in a recipe view
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Full recipe view
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<IngredientLineResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
}

/// Assemble the full recipe view for a viewer.
async fn build_recipe_response(
    state: &AppState,
    recipe: Recipe,
    viewer: Option<&crate::models::User>,
) -> Result<RecipeResponse, ApiError> {
    let tags = state.recipe_service.tags(recipe.id).await?;
    let lines = state.recipe_service.ingredient_lines(recipe.id).await?;

    let author = state
        .user_service
        .get_by_id(recipe.author_id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Recipe author missing"))?;

    let is_subscribed = state
        .relation_service
        .is_subscribed(viewer, author.id)
        .await?;
    let is_favorited = state
        .relation_service
        .is_favorited(viewer, recipe.id)
        .await?;
    let is_in_shopping_cart = state.relation_service.is_in_cart(viewer, recipe.id).await?;

    Ok(RecipeResponse {
        id: recipe.id,
        tags: tags
            .into_iter()
            .map(|t| TagResponse {
                id: t.id,
                name: t.name,
                color: t.color,
                slug: t.slug,
            })
            .collect(),
        author: UserResponse::new(author, is_subscribed),
        ingredients: lines
            .into_iter()
            .map(|l| IngredientLineResponse {
                id: l.ingredient_id,
                name: l.name,
                measurement_unit: l.measurement_unit,
                amount: l.amount,
            })
            .collect(),
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

/// GET /api/recipes/ - paginated recipe listing
pub async fn list_recipes(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<ListRecipesQuery>,
) -> Result<Json<PagedResponse<RecipeResponse>>, ApiError> {
    let params = crate::models::ListParams::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(state.page_size),
    );

    let mut filters = RecipeFilters {
        author_id: query.author,
        tag_slugs: query
            .tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        ..Default::default()
    };

    // The viewer-relative filters only mean something for an authenticated
    // caller; anonymous requests ignore them.
    if let Some(user) = viewer.as_user() {
        if query.is_favorited == Some(1) {
            filters.favorited_by = Some(user.id);
        }
        if query.is_in_shopping_cart == Some(1) {
            filters.in_cart_of = Some(user.id);
        }
    }

    let page = state.recipe_service.list(&filters, &params).await?;

    let mut results = Vec::with_capacity(page.items.len());
    for recipe in &page.items {
        results.push(build_recipe_response(&state, recipe.clone(), viewer.as_user()).await?);
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

/// GET /api/recipes/{id}/ - recipe detail
pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let recipe = state.recipe_service.get(id).await?;
    let response = build_recipe_response(&state, recipe, viewer.as_user()).await?;
    Ok(Json(response))
}

/// POST /api/recipes/ - create a recipe
pub async fn create_recipe(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<RecipePayload>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let recipe = state.recipe_service.create(&user.0, payload).await?;
    let response = build_recipe_response(&state, recipe, Some(&user.0)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PATCH /api/recipes/{id}/ - update a recipe
pub async fn update_recipe(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<RecipePayload>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let recipe = state.recipe_service.update(id, &user.0, payload).await?;
    let response = build_recipe_response(&state, recipe, Some(&user.0)).await?;
    Ok(Json(response))
}

/// DELETE /api/recipes/{id}/ - delete a recipe
pub async fn delete_recipe(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.recipe_service.delete(id, &user.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/favorite/ - favorite a recipe
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ReducedRecipeResponse>), ApiError> {
    let recipe = state.relation_service.add_favorite(&user.0, id).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

/// DELETE /api/recipes/{id}/favorite/ - remove a favorite
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.relation_service.remove_favorite(&user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/shopping_cart/ - add to cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ReducedRecipeResponse>), ApiError> {
    let recipe = state.relation_service.add_to_cart(&user.0, id).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

/// DELETE /api/recipes/{id}/shopping_cart/ - remove from cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.relation_service.remove_from_cart(&user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/recipes/download_shopping_cart/ - download the aggregated list
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    let document = state.shopping_list_service.document(user.0.id).await?;
    let filename = format!("{}_shopping_list.txt", user.0.username);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", filename),
        )
        .body(axum::body::Body::from(document))
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(response.into_response())
}
