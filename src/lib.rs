//! Mediateca Library Management Server
//!
//! A Rust REST backend for school libraries: polymorphic catalog, physical
//! copy tracking with generated registration codes, loans and reservations,
//! and centre-scoped access control for staff accounts.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub repository: repository::Repository,
    pub pool: sqlx::PgPool,
}
