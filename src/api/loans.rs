//! Loan and reservation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, CreateReservation, LoanDetails, LoanQuery, Reservation},
    AppState,
};

use super::AuthenticatedUser;

/// List loans within the actor's centre scope
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans visible to the actor", body = Vec<LoanDetails>),
        (status = 403, description = "Staff account required")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list(&user, &query).await?;
    Ok(Json(loans))
}

/// Create a loan. The copy gets excluded from loan as a side effect.
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 403, description = "Copy belongs to another centre"),
        (status = 404, description = "User or copy not found"),
        (status = 409, description = "Copy excluded from loan or decommissioned")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let loan = state.services.loans.create(&user, &request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a loaned copy
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan closed", body = LoanDetails),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.return_loan(&user, id).await?;
    Ok(Json(loan))
}

/// List reservations within scope
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Reservations visible to the actor", body = Vec<Reservation>)
    )
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state.services.loans.list_reservations(&user).await?;
    Ok(Json(reservations))
}

/// Reserve a copy for a user
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 404, description = "User or copy not found")
    )
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = state.services.loans.create_reservation(&user, &request).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}
