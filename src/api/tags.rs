//! Tag API endpoints
//!
//! - GET /api/tags/ - tag catalog
//! - GET /api/tags/{id}/ - single tag

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::Tag;

/// Response for a single tag
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        }
    }
}

/// GET /api/tags/ - list all tags
pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = state.tag_service.list().await?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

/// GET /api/tags/{id}/ - single tag
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TagResponse>, ApiError> {
    let tag = state.tag_service.get(id).await?;
    Ok(Json(tag.into()))
}
