//! User administration endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{
        CreateUser, ImportReport, ImportUserRecord, UpdateUser, User, UserQuery, UserShort,
    },
    AppState,
};

use super::AuthenticatedUser;

/// Search users within the actor's centre scope
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "Users visible to the actor", body = Vec<UserShort>),
        (status = 403, description = "Staff account required")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserShort>>> {
    let users = state.services.users.search(&user, &query).await?;
    Ok(Json(users))
}

/// Borrower candidates for the loan form: same centre, no staff accounts,
/// not the actor
#[utoipa::path(
    get,
    path = "/users/borrowers",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Eligible borrowers", body = Vec<UserShort>)
    )
)]
pub async fn list_borrowers(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<Vec<UserShort>>> {
    let users = state.services.users.list_borrowers(&user).await?;
    Ok(Json(users))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    crate::policy::require_staff(&actor)?;
    let user = state.services.users.get(id).await?;
    Ok(Json(user))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input, e.g. staff without centre"),
        (status = 409, description = "Username, email or phone already taken")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.users.create(&actor, &request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Staff promotion without a centre"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    let user = state.services.users.update(&actor, id, &request).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.users.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk user import. Records succeed or fail independently; the report
/// carries counts and per-record error details.
#[utoipa::path(
    post,
    path = "/users/import",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = Vec<ImportUserRecord>,
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 403, description = "Staff account required")
    )
)]
pub async fn import(
    State(state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(records): Json<Vec<ImportUserRecord>>,
) -> AppResult<Json<ImportReport>> {
    let report = state.services.users.import(&actor, &records).await?;
    Ok(Json(report))
}
