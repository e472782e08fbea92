//! Error types for the Mediateca server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable application error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchEntry = 5,
    NoSuchCopy = 6,
    CopyExcluded = 7,
    CopyDecommissioned = 8,
    WrongCentre = 9,
    Duplicate = 10,
    BadValue = 11,
    CentreInUse = 12,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// Authorization failure with a precise code (wrong centre)
    #[error("Authorization failed: {message}")]
    AuthorizationCoded { code: ErrorCode, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Not-found with a precise code (user, copy)
    #[error("Not found: {message}")]
    NotFoundCoded { code: ErrorCode, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Conflict with a precise error code (copy excluded, decommissioned, ...)
    #[error("Conflict: {message}")]
    ConflictCoded { code: ErrorCode, message: String },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Conflict on a copy that is already excluded from loan
    pub fn copy_excluded() -> Self {
        AppError::ConflictCoded {
            code: ErrorCode::CopyExcluded,
            message: "Copy is already on loan or excluded from loan".to_string(),
        }
    }

    /// Conflict on a decommissioned copy
    pub fn copy_decommissioned() -> Self {
        AppError::ConflictCoded {
            code: ErrorCode::CopyDecommissioned,
            message: "Copy is decommissioned".to_string(),
        }
    }

    /// Authorization failure for a resource outside the actor's centre
    pub fn wrong_centre() -> Self {
        AppError::AuthorizationCoded {
            code: ErrorCode::WrongCentre,
            message: "Resource belongs to another centre".to_string(),
        }
    }

    pub fn user_not_found(id: i32) -> Self {
        AppError::NotFoundCoded {
            code: ErrorCode::NoSuchUser,
            message: format!("User {} not found", id),
        }
    }

    pub fn copy_not_found(id: i32) -> Self {
        AppError::NotFoundCoded {
            code: ErrorCode::NoSuchCopy,
            message: format!("Copy {} not found", id),
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::AuthorizationCoded { code, message } => {
                (StatusCode::FORBIDDEN, *code, message.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchEntry, msg.clone())
            }
            AppError::NotFoundCoded { code, message } => {
                (StatusCode::NOT_FOUND, *code, message.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::ConflictCoded { code, message } => {
                (StatusCode::CONFLICT, *code, message.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Map a sqlx error to Conflict when it is a unique or foreign-key violation.
/// Registration-code collisions and duplicate emails surface here.
pub fn map_constraint_violation(err: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.kind() {
            sqlx::error::ErrorKind::UniqueViolation => {
                return AppError::Conflict(format!("{} already exists", what));
            }
            sqlx::error::ErrorKind::ForeignKeyViolation => {
                return AppError::ConflictCoded {
                    code: ErrorCode::CentreInUse,
                    message: format!("{} is still referenced", what),
                };
            }
            _ => {}
        }
    }
    AppError::Database(err)
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn copy_excluded_maps_to_conflict() {
        let resp = AppError::copy_excluded().into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn wrong_centre_maps_to_forbidden() {
        let resp = AppError::wrong_centre().into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn wrong_centre_carries_its_own_code() {
        match AppError::wrong_centre() {
            AppError::AuthorizationCoded { code, .. } => {
                assert_eq!(code, ErrorCode::WrongCentre);
            }
            other => panic!("expected coded authorization error, got {:?}", other),
        }
    }

    #[test]
    fn missing_user_and_copy_have_distinct_codes() {
        match AppError::user_not_found(7) {
            AppError::NotFoundCoded { code, .. } => assert_eq!(code, ErrorCode::NoSuchUser),
            other => panic!("expected coded not-found, got {:?}", other),
        }
        match AppError::copy_not_found(7) {
            AppError::NotFoundCoded { code, .. } => assert_eq!(code, ErrorCode::NoSuchCopy),
            other => panic!("expected coded not-found, got {:?}", other),
        }
        assert_eq!(
            AppError::copy_not_found(7).into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let resp = AppError::Validation("missing title".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
