//! Services layer - Business logic
//!
//! This module contains all business logic services for the Forkful recipe
//! backend. Services are responsible for:
//! - Implementing business rules and validation
//! - Coordinating repositories inside one storage transaction per mutation
//! - Translating storage-layer failures into the service error taxonomy

pub mod ingredient;
pub mod media;
pub mod recipe;
pub mod relations;
pub mod shopping_list;
pub mod tag;
pub mod user;

pub use ingredient::{IngredientService, SeedReport};
pub use media::MediaStore;
pub use recipe::{
    RecipeService, MAX_AMOUNT, MAX_COOKING_TIME, MIN_AMOUNT, MIN_COOKING_TIME,
};
pub use relations::RelationService;
pub use shopping_list::{aggregate_lines, ShoppingListEntry, ShoppingListService};
pub use tag::TagService;
pub use user::{hash_password, verify_password, LoginInput, RegisterInput, UserService};

/// Error taxonomy shared by every service operation.
///
/// All four caller-visible kinds map one-to-one onto structured API
/// responses; `Internal` wraps storage and infrastructure faults that must
/// never leak their raw form to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad field value: bounds, format, reserved username, non-positive limit
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate relationship pair or taken unique field
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Referenced entity or relationship absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unauthorized mutation
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
