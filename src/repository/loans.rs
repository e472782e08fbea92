//! Loans and reservations repository

use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        copy::Copy,
        loan::{CreateLoan, Loan, LoanDetails, LoanQuery, Reservation},
        user::UserShort,
    },
    policy::CentreScope,
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    /// Create a loan. The copy row is locked for the whole transaction, so
    /// two concurrent requests on the same copy serialize and the loser sees
    /// the flag already set. Preconditions are checked in a fixed order,
    /// each with its own error: excluded, decommissioned, wrong centre.
    ///
    /// On success the copy is marked excluded-from-loan and an audit entry
    /// is appended, all inside the same transaction.
    pub async fn create(
        &self,
        loan: &CreateLoan,
        scope: CentreScope,
        actor_name: &str,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let copy = sqlx::query_as::<_, Copy>("SELECT * FROM copies WHERE id = $1 FOR UPDATE")
            .bind(loan.copy_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::copy_not_found(loan.copy_id))?;

        if !copy.is_loanable() {
            // Exclusion is reported before decommissioning
            return Err(if copy.excluded_from_loan {
                AppError::copy_excluded()
            } else {
                AppError::copy_decommissioned()
            });
        }
        if !scope.allows(copy.centre_id) {
            return Err(AppError::wrong_centre());
        }

        let created = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, copy_id, loan_date, annotations)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(loan.user_id)
        .bind(loan.copy_id)
        .bind(Utc::now())
        .bind(&loan.annotations)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE copies SET excluded_from_loan = TRUE WHERE id = $1")
            .bind(loan.copy_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO audit_logs (actor, action, level) VALUES ($1, $2, 'INFO')")
            .bind(actor_name)
            .bind(format!(
                "Loan created: copy {} to user {}",
                copy.registration_code, loan.user_id
            ))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    /// Close a loan: set the return date and make the copy loanable again
    pub async fn return_loan(&self, loan_id: i32, actor_name: &str) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", loan_id)))?;

        if loan.return_date.is_some() {
            return Err(AppError::Conflict("Loan already returned".to_string()));
        }

        let returned = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET return_date = $2 WHERE id = $1 RETURNING *",
        )
        .bind(loan_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE copies SET excluded_from_loan = FALSE WHERE id = $1")
            .bind(loan.copy_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO audit_logs (actor, action, level) VALUES ($1, $2, 'INFO')")
            .bind(actor_name)
            .bind(format!("Loan {} returned", loan_id))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(returned)
    }

    /// List loans with denormalized user and copy summaries, restricted by
    /// the actor's centre scope.
    pub async fn list(&self, query: &LoanQuery, scope: CentreScope) -> AppResult<Vec<LoanDetails>> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

        let rows = sqlx::query(
            r#"
            SELECT l.id AS loan_id, l.loan_date, l.return_date, l.annotations,
                   l.copy_id, c.registration_code, c.centre_id,
                   e.title, e.author,
                   u.id AS user_id, u.username, u.email, u.first_name,
                   u.last_name, u.centre_id AS user_centre_id
            FROM loans l
            JOIN copies c ON c.id = l.copy_id
            JOIN catalog_entries e ON e.id = c.entry_id
            JOIN users u ON u.id = l.user_id
            WHERE ($1::int IS NULL OR c.centre_id = $1)
              AND ($2::int IS NULL OR l.user_id = $2)
              AND ($3::bool IS NOT TRUE OR l.return_date IS NULL)
            ORDER BY l.loan_date DESC, l.id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(scope.centre_filter())
        .bind(query.user_id)
        .bind(query.active)
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Load the denormalized view of one loan
    pub async fn get_details(&self, loan_id: i32) -> AppResult<LoanDetails> {
        let row = sqlx::query(
            r#"
            SELECT l.id AS loan_id, l.loan_date, l.return_date, l.annotations,
                   l.copy_id, c.registration_code, c.centre_id,
                   e.title, e.author,
                   u.id AS user_id, u.username, u.email, u.first_name,
                   u.last_name, u.centre_id AS user_centre_id
            FROM loans l
            JOIN copies c ON c.id = l.copy_id
            JOIN catalog_entries e ON e.id = c.entry_id
            JOIN users u ON u.id = l.user_id
            WHERE l.id = $1
            "#,
        )
        .bind(loan_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", loan_id)))?;

        Ok(details_from_row(&row))
    }

    /// Create a reservation; only existence of user and copy is required
    pub async fn create_reservation(&self, user_id: i32, copy_id: i32) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (user_id, copy_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(copy_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    /// List reservations, newest first, scoped by the copy's centre
    pub async fn list_reservations(&self, scope: CentreScope) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT r.*
            FROM reservations r
            JOIN copies c ON c.id = r.copy_id
            WHERE ($1::int IS NULL OR c.centre_id = $1)
            ORDER BY r.reserved_on DESC
            "#,
        )
        .bind(scope.centre_filter())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

fn details_from_row(row: &PgRow) -> LoanDetails {
    LoanDetails {
        id: row.get("loan_id"),
        loan_date: row.get("loan_date"),
        return_date: row.get("return_date"),
        annotations: row.get("annotations"),
        user: UserShort {
            id: row.get("user_id"),
            username: row.get("username"),
            email: row.get("email"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            centre_id: row.get("user_centre_id"),
        },
        copy_id: row.get("copy_id"),
        registration_code: row.get("registration_code"),
        centre_id: row.get("centre_id"),
        title: row.get("title"),
        author: row.get("author"),
    }
}
