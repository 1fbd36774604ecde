//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the Forkful recipe
//! backend:
//! - Recipe endpoints (CRUD, favorite/cart toggles, shopping list download)
//! - Ingredient and tag catalog endpoints
//! - User endpoints (registration, profiles, subscriptions)
//! - Auth endpoints (token login/logout)

pub mod auth;
pub mod common;
pub mod ingredients;
pub mod middleware;
pub mod recipes;
pub mod tags;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser, Viewer};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Routes that demand an authenticated caller
    let protected_routes = Router::new()
        .route("/recipes/", post(recipes::create_recipe))
        .route(
            "/recipes/{id}/",
            axum::routing::patch(recipes::update_recipe).delete(recipes::delete_recipe),
        )
        .route(
            "/recipes/{id}/favorite/",
            post(recipes::add_favorite).delete(recipes::remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart/",
            post(recipes::add_to_cart).delete(recipes::remove_from_cart),
        )
        .route(
            "/recipes/download_shopping_cart/",
            get(recipes::download_shopping_cart),
        )
        .route("/users/me/", get(users::me))
        .route(
            "/users/{id}/subscribe/",
            post(users::subscribe).delete(users::unsubscribe),
        )
        .route("/users/subscriptions/", get(users::subscriptions))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes; the optional viewer drives the per-user flags
    Router::new()
        .route("/recipes/", get(recipes::list_recipes))
        .route("/recipes/{id}/", get(recipes::get_recipe))
        .route("/ingredients/", get(ingredients::list_ingredients))
        .route("/ingredients/{id}/", get(ingredients::get_ingredient))
        .route("/tags/", get(tags::list_tags))
        .route("/tags/{id}/", get(tags::get_tag))
        .route("/users/", post(users::register).get(users::list_users))
        .route("/users/{id}/", get(users::get_user))
        .route("/auth/token/login/", post(auth::login))
        .route("/auth/token/logout/", post(auth::logout))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
