//! Ingredient API endpoints
//!
//! - GET /api/ingredients/?name= - catalog listing with prefix search
//! - GET /api/ingredients/{id}/ - single catalog entry

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::Ingredient;

/// Query parameters for the ingredient listing
#[derive(Debug, Default, Deserialize)]
pub struct ListIngredientsQuery {
    /// Case-insensitive name prefix
    pub name: Option<String>,
}

/// Response for a single ingredient
#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// GET /api/ingredients/ - list or prefix-search the catalog
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<ListIngredientsQuery>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let ingredients = state
        .ingredient_service
        .list(query.name.as_deref())
        .await?;

    Ok(Json(ingredients.into_iter().map(Into::into).collect()))
}

/// GET /api/ingredients/{id}/ - single catalog entry
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let ingredient = state.ingredient_service.get(id).await?;
    Ok(Json(ingredient.into()))
}
