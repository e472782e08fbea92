//! API handlers for the Mediateca REST endpoints

pub mod auth;
pub mod catalog;
pub mod copies;
pub mod health;
pub mod loans;
pub mod logs;
pub mod openapi;
pub mod reference;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::user::User, AppState};

/// Extractor resolving the bearer token to the acting user
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::Authentication("Invalid authorization header format".to_string())
            })?;

        let user = state.services.users.user_for_token(token).await?;

        Ok(AuthenticatedUser(user))
    }
}
