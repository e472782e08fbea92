//! Reference-data endpoints: centres, groups, countries, languages, categories

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::reference::{Category, CreateCategory, CreateNamedRef, NamedRef},
    policy,
    repository::reference::RefKind,
    AppState,
};

use super::AuthenticatedUser;

macro_rules! ref_handlers {
    ($list:ident, $create:ident, $delete:ident, $kind:expr, $path:literal, $item_path:literal) => {
        #[utoipa::path(
            get,
            path = $path,
            tag = "reference",
            security(("bearer_auth" = [])),
            responses(
                (status = 200, description = "All rows, sorted by name", body = Vec<NamedRef>)
            )
        )]
        pub async fn $list(
            State(state): State<AppState>,
            AuthenticatedUser(_user): AuthenticatedUser,
        ) -> AppResult<Json<Vec<NamedRef>>> {
            let rows = state.repository.reference.list($kind).await?;
            Ok(Json(rows))
        }

        #[utoipa::path(
            post,
            path = $path,
            tag = "reference",
            security(("bearer_auth" = [])),
            request_body = CreateNamedRef,
            responses(
                (status = 201, description = "Row created", body = NamedRef),
                (status = 403, description = "Staff account required")
            )
        )]
        pub async fn $create(
            State(state): State<AppState>,
            AuthenticatedUser(user): AuthenticatedUser,
            Json(request): Json<CreateNamedRef>,
        ) -> AppResult<(StatusCode, Json<NamedRef>)> {
            policy::require_staff(&user)?;
            let row = state.repository.reference.create($kind, &request.name).await?;
            Ok((StatusCode::CREATED, Json(row)))
        }

        #[utoipa::path(
            delete,
            path = $item_path,
            tag = "reference",
            security(("bearer_auth" = [])),
            params(("id" = i32, Path, description = "Row ID")),
            responses(
                (status = 204, description = "Row deleted"),
                (status = 404, description = "Row not found"),
                (status = 409, description = "Row still referenced")
            )
        )]
        pub async fn $delete(
            State(state): State<AppState>,
            AuthenticatedUser(user): AuthenticatedUser,
            Path(id): Path<i32>,
        ) -> AppResult<StatusCode> {
            policy::require_staff(&user)?;
            state.repository.reference.delete($kind, id).await?;
            Ok(StatusCode::NO_CONTENT)
        }
    };
}

ref_handlers!(list_centres, create_centre, delete_centre, RefKind::Centre, "/centres", "/centres/{id}");
ref_handlers!(list_groups, create_group, delete_group, RefKind::Group, "/groups", "/groups/{id}");
ref_handlers!(list_countries, create_country, delete_country, RefKind::Country, "/countries", "/countries/{id}");
ref_handlers!(list_languages, create_language, delete_language, RefKind::Language, "/languages", "/languages/{id}");

/// List category tags
#[utoipa::path(
    get,
    path = "/categories",
    tag = "reference",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All categories", body = Vec<Category>)
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> AppResult<Json<Vec<Category>>> {
    let rows = state.repository.reference.list_categories().await?;
    Ok(Json(rows))
}

/// Create a category tag
#[utoipa::path(
    post,
    path = "/categories",
    tag = "reference",
    security(("bearer_auth" = [])),
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category)
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    policy::require_staff(&user)?;
    let row = state
        .repository
        .reference
        .create_category(&request.name, request.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}
