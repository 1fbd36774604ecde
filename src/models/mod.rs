//! Data models
//!
//! This module contains all data structures used throughout the Forkful
//! recipe backend. Models represent:
//! - Database entities (User, Session, Ingredient, Tag, Recipe and its
//!   join rows, plus the pure relationship records)
//! - Input types for mutations
//! - Pagination containers

mod ingredient;
mod recipe;
mod session;
mod tag;
mod user;

pub use ingredient::Ingredient;
pub use recipe::{
    IngredientAmount, IngredientLine, ListParams, PagedResult, Recipe, RecipeFilters,
    RecipePayload, RecipeWrite,
};
pub use session::Session;
pub use tag::Tag;
pub use user::{User, UserRole};
