//! Copy registry endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::copy::{Copy, CopyDetails, CopyQuery, CreateCopy},
    AppState,
};

use super::AuthenticatedUser;

/// List copies visible to the acting staff user
#[utoipa::path(
    get,
    path = "/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(CopyQuery),
    responses(
        (status = 200, description = "Copies within the actor's centre scope", body = Vec<CopyDetails>),
        (status = 403, description = "Staff account required")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<CopyQuery>,
) -> AppResult<Json<Vec<CopyDetails>>> {
    let copies = state.services.copies.list(&user, &query).await?;
    Ok(Json(copies))
}

/// Register a new copy; a registration code is assigned automatically
#[utoipa::path(
    post,
    path = "/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    request_body = CreateCopy,
    responses(
        (status = 201, description = "Copy created", body = Copy),
        (status = 404, description = "Catalog entry not found"),
        (status = 409, description = "Registration code collision")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<CreateCopy>,
) -> AppResult<(StatusCode, Json<Copy>)> {
    let copy = state.services.copies.create(&user, &request).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Decommission a copy
#[utoipa::path(
    post,
    path = "/copies/{id}/decommission",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy decommissioned", body = Copy),
        (status = 403, description = "Copy belongs to another centre"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn decommission(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Copy>> {
    let copy = state.services.copies.decommission(&user, id).await?;
    Ok(Json(copy))
}

/// Exclude a copy from loan without decommissioning it
#[utoipa::path(
    post,
    path = "/copies/{id}/exclude",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy excluded from loan", body = Copy),
        (status = 403, description = "Copy belongs to another centre"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn exclude(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Copy>> {
    let copy = state.services.copies.exclude_from_loan(&user, id).await?;
    Ok(Json(copy))
}

/// Make a copy loanable again
#[utoipa::path(
    post,
    path = "/copies/{id}/restore",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy restored", body = Copy),
        (status = 403, description = "Copy belongs to another centre"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn restore(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Copy>> {
    let copy = state.services.copies.restore(&user, id).await?;
    Ok(Json(copy))
}
