//! Forkful - a recipe sharing backend
//!
//! This library provides the core functionality for the Forkful recipe
//! backend: recipes with ingredient quantities and tags, favorites, a
//! shopping cart with consolidated list export, and author subscriptions.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
