//! Tag model
//!
//! Reference data used to label recipes. Name, color and slug are each
//! unique across the catalog.

use serde::{Deserialize, Serialize};

/// A recipe tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Display name (unique)
    pub name: String,
    /// Hex color, e.g. "#49B64E" (unique)
    pub color: String,
    /// URL-friendly slug (unique)
    pub slug: String,
}

impl Tag {
    pub fn new(name: String, color: String, slug: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            color,
            slug,
        }
    }
}
