//! Forkful - a recipe sharing backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forkful::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCartRepository, SqlxFavoriteRepository, SqlxIngredientRepository,
            SqlxRecipeRepository, SqlxSessionRepository, SqlxSubscriptionRepository,
            SqlxTagRepository, SqlxUserRepository,
        },
    },
    services::{
        IngredientService, MediaStore, RecipeService, RelationService, ShoppingListService,
        TagService, UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forkful=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Forkful recipe backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Wire repositories and services
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let ingredient_repo = SqlxIngredientRepository::boxed(pool.clone());
    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    let recipe_repo = SqlxRecipeRepository::boxed(pool.clone());
    let favorite_repo = SqlxFavoriteRepository::boxed(pool.clone());
    let cart_repo = SqlxCartRepository::boxed(pool.clone());
    let subscription_repo = SqlxSubscriptionRepository::boxed(pool.clone());

    let media = MediaStore::new(&config.media);

    let state = AppState {
        user_service: Arc::new(UserService::new(user_repo.clone(), session_repo)),
        recipe_service: Arc::new(RecipeService::new(
            recipe_repo.clone(),
            ingredient_repo.clone(),
            tag_repo.clone(),
            media,
        )),
        ingredient_service: Arc::new(IngredientService::new(ingredient_repo)),
        tag_service: Arc::new(TagService::new(tag_repo)),
        relation_service: Arc::new(RelationService::new(
            favorite_repo,
            cart_repo.clone(),
            subscription_repo,
            recipe_repo,
            user_repo,
        )),
        shopping_list_service: Arc::new(ShoppingListService::new(cart_repo)),
        page_size: config.pagination.page_size,
    };

    let router = api::build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
