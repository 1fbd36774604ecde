//! Repository layer
//!
//! One repository per aggregate: trait defining the data-access interface
//! plus a sqlx implementation. Services depend on the traits so tests can
//! wire them against an in-memory database.

mod ingredient;
mod recipe;
mod relations;
mod session;
mod tag;
mod user;

pub use ingredient::{IngredientRepository, SqlxIngredientRepository};
pub use recipe::{RecipeRepository, SqlxRecipeRepository};
pub use relations::{
    CartRepository, FavoriteRepository, SqlxCartRepository, SqlxFavoriteRepository,
    SqlxSubscriptionRepository, SubscriptionRepository,
};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};
