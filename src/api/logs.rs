//! Audit log endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::log::AuditLog, policy, AppState};

use super::AuthenticatedUser;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LogListQuery {
    pub limit: Option<i64>,
}

/// Recent audit entries, newest first
#[utoipa::path(
    get,
    path = "/logs",
    tag = "logs",
    security(("bearer_auth" = [])),
    params(LogListQuery),
    responses(
        (status = 200, description = "Audit log entries", body = Vec<AuditLog>),
        (status = 403, description = "Staff account required")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<LogListQuery>,
) -> AppResult<Json<Vec<AuditLog>>> {
    policy::require_staff(&user)?;
    let entries = state.repository.logs.list(query.limit.unwrap_or(100)).await?;
    Ok(Json(entries))
}
