//! Catalog endpoints: search, suggestions, entries

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::catalog::{
        CatalogEntry, CatalogQuery, CatalogSummary, CreateCatalogEntry, Suggestion,
    },
    AppState,
};

use super::AuthenticatedUser;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SuggestionQuery {
    pub q: String,
}

/// Search the catalog. An empty query returns the full catalog.
#[utoipa::path(
    get,
    path = "/catalog/search",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(CatalogQuery),
    responses(
        (status = 200, description = "Matching catalog entries with copy counts", body = Vec<CatalogSummary>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn search(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<Vec<CatalogSummary>>> {
    let results = state.services.catalog.search(&query).await?;
    Ok(Json(results))
}

/// Autocomplete suggestions, with external fallback when local hits are scarce
#[utoipa::path(
    get,
    path = "/catalog/suggestions",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(SuggestionQuery),
    responses(
        (status = 200, description = "At most 10 deduplicated suggestions", body = Vec<Suggestion>)
    )
)]
pub async fn suggestions(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<SuggestionQuery>,
) -> AppResult<Json<Vec<Suggestion>>> {
    let results = state.services.catalog.suggestions(&query.q).await?;
    Ok(Json(results))
}

/// Get catalog entry details
#[utoipa::path(
    get,
    path = "/catalog/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Catalog entry ID")),
    responses(
        (status = 200, description = "Entry with its variant", body = CatalogEntry),
        (status = 404, description = "Entry not found")
    )
)]
pub async fn get_entry(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<CatalogEntry>> {
    let entry = state.services.catalog.get_entry(id).await?;
    Ok(Json(entry))
}

/// Create a catalog entry with its subtype
#[utoipa::path(
    post,
    path = "/catalog",
    tag = "catalog",
    security(("bearer_auth" = [])),
    request_body = CreateCatalogEntry,
    responses(
        (status = 201, description = "Entry created", body = CatalogEntry),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_entry(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(entry): Json<CreateCatalogEntry>,
) -> AppResult<(StatusCode, Json<CatalogEntry>)> {
    crate::policy::require_staff(&user)?;
    let created = state.services.catalog.create_entry(entry).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a catalog entry; its copies cascade away with it
#[utoipa::path(
    delete,
    path = "/catalog/{id}",
    tag = "catalog",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Catalog entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found")
    )
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    crate::policy::require_staff(&user)?;
    state.services.catalog.delete_entry(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
