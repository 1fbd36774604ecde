//! Tag service
//!
//! Read access to the tag catalog.

use crate::db::repositories::TagRepository;
use crate::models::Tag;
use anyhow::Context;
use std::sync::Arc;

use super::ServiceError;

/// Tag catalog service.
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    /// Get a tag by ID.
    pub async fn get(&self, id: i64) -> Result<Tag, ServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get tag")?
            .ok_or_else(|| ServiceError::NotFound(format!("Tag {} not found", id)))
    }

    /// List all tags.
    pub async fn list(&self) -> Result<Vec<Tag>, ServiceError> {
        Ok(self.repo.list().await.context("Failed to list tags")?)
    }
}
