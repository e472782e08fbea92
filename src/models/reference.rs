//! Reference data: countries, languages, categories, centres, groups

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Generic named lookup row (countries, languages, centres, groups)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NamedRef {
    pub id: i32,
    pub name: String,
}

/// Category with optional parent for hierarchical tags
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
}

/// Create request shared by the flat lookup tables
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNamedRef {
    pub name: String,
}

/// Create category request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategory {
    pub name: String,
    pub parent_id: Option<i32>,
}
