//! Loan and reservation ledger service

use crate::{
    error::AppResult,
    models::{
        loan::{CreateLoan, CreateReservation, LoanDetails, LoanQuery, Reservation},
        user::User,
    },
    policy,
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a loan on behalf of a borrower. The repository runs the
    /// precondition chain and the flag write inside one transaction; this
    /// layer verifies the actor and the borrower up front.
    pub async fn create(&self, actor: &User, request: &CreateLoan) -> AppResult<LoanDetails> {
        policy::require_staff(actor)?;
        self.repository.users.get_by_id(request.user_id).await?;

        let loan = self
            .repository
            .loans
            .create(request, policy::scope_for(actor), &actor.username)
            .await?;

        self.repository.loans.get_details(loan.id).await
    }

    /// Close a loan and make the copy available again
    pub async fn return_loan(&self, actor: &User, loan_id: i32) -> AppResult<LoanDetails> {
        policy::require_staff(actor)?;

        let details = self.repository.loans.get_details(loan_id).await?;
        policy::require_in_scope(actor, details.centre_id)?;

        self.repository.loans.return_loan(loan_id, &actor.username).await?;
        self.repository.loans.get_details(loan_id).await
    }

    /// List loans visible to the actor
    pub async fn list(&self, actor: &User, query: &LoanQuery) -> AppResult<Vec<LoanDetails>> {
        policy::require_staff(actor)?;
        self.repository.loans.list(query, policy::scope_for(actor)).await
    }

    /// Reserve a copy; no availability precondition applies
    pub async fn create_reservation(
        &self,
        actor: &User,
        request: &CreateReservation,
    ) -> AppResult<Reservation> {
        policy::require_staff(actor)?;
        self.repository.users.get_by_id(request.user_id).await?;
        self.repository.copies.get_by_id(request.copy_id).await?;

        self.repository
            .loans
            .create_reservation(request.user_id, request.copy_id)
            .await
    }

    /// List reservations visible to the actor
    pub async fn list_reservations(&self, actor: &User) -> AppResult<Vec<Reservation>> {
        policy::require_staff(actor)?;
        self.repository
            .loans
            .list_reservations(policy::scope_for(actor))
            .await
    }
}
