//! Loan and reservation models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::user::UserShort;

/// Loan record from database. `return_date` null means the loan is active.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub copy_id: i32,
    pub loan_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub annotations: Option<String>,
}

/// Loan with denormalized user and copy summaries for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub loan_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub annotations: Option<String>,
    pub user: UserShort,
    pub copy_id: i32,
    pub registration_code: String,
    pub centre_id: i32,
    pub title: String,
    pub author: Option<String>,
}

/// Create loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub user_id: i32,
    pub copy_id: i32,
    pub annotations: Option<String>,
}

/// Reservation record; a weaker hold with no return tracking
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: i32,
    pub user_id: i32,
    pub copy_id: i32,
    pub reserved_on: DateTime<Utc>,
}

/// Create reservation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservation {
    pub user_id: i32,
    pub copy_id: i32,
}

/// Loan listing parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub user_id: Option<i32>,
    /// When true only loans without a return date
    pub active: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
