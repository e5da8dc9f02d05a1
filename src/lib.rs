//! Librarium Library Management Backend
//!
//! A Rust backend for managing a book catalog, user accounts, and
//! borrow/return transactions, exposed over REST and GraphQL.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod graphql;
pub mod models;
pub mod repository;
pub mod services;
pub mod token;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub schema: graphql::LibrariumSchema,
}
