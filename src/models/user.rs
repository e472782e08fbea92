//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub centre_id: Option<i32>,
    pub group_id: Option<i32>,
    pub image_url: Option<String>,
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_librarian: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Short user representation for lists and loan details
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub centre_id: Option<i32>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub centre_id: Option<i32>,
    pub group_id: Option<i32>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

/// Update user request, all fields optional
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(email)]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub centre_id: Option<i32>,
    pub group_id: Option<i32>,
    pub image_url: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

/// One record in a bulk user import payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportUserRecord {
    pub email: String,
    /// Given name
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub second_last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Centre name, created on the fly when missing
    #[serde(default)]
    pub centre: Option<String>,
    /// Group name, created on the fly when missing
    #[serde(default)]
    pub group: Option<String>,
}

impl ImportUserRecord {
    /// Combined last name, the way the import sheet splits surnames
    pub fn full_last_name(&self) -> Option<String> {
        let joined = [self.last_name.as_deref(), self.second_last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let joined = joined.trim().to_string();
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// Per-record failure detail in an import report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ImportError {
    pub email: String,
    pub error: String,
}

/// Aggregate result of a bulk import. Each record succeeds or fails on its
/// own; the batch never aborts as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    pub created: u32,
    pub updated: u32,
    pub errors: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_details: Vec<ImportError>,
}

impl ImportReport {
    pub fn record_created(&mut self) {
        self.created += 1;
    }

    pub fn record_error(&mut self, email: impl Into<String>, error: impl Into<String>) {
        self.errors += 1;
        self.error_details.push(ImportError {
            email: email.into(),
            error: error.into(),
        });
    }
}

/// User listing parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Substring matched against username, email and names
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Token request body (username + password)
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_report_aggregates_per_record() {
        let mut report = ImportReport::default();
        report.record_created();
        report.record_created();
        report.record_error("dup@example.org", "email already registered");

        assert_eq!(report.created, 2);
        assert_eq!(report.errors, 1);
        assert_eq!(report.error_details.len(), 1);
        assert_eq!(report.error_details[0].email, "dup@example.org");
    }

    #[test]
    fn surnames_join_and_trim() {
        let rec = ImportUserRecord {
            email: "a@b.c".into(),
            first_name: "Anna".into(),
            last_name: Some("Puig".into()),
            second_last_name: Some("Serra".into()),
            phone: None,
            centre: None,
            group: None,
        };
        assert_eq!(rec.full_last_name().as_deref(), Some("Puig Serra"));

        let rec = ImportUserRecord {
            email: "a@b.c".into(),
            first_name: "Anna".into(),
            last_name: None,
            second_last_name: None,
            phone: None,
            centre: None,
            group: None,
        };
        assert_eq!(rec.full_last_name(), None);
    }
}
