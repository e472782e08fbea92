//! Copies repository: registration-code assignment and flag handling

use chrono::{Datelike, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    error::{map_constraint_violation, AppError, AppResult},
    models::copy::{format_registration_code, parse_registration_code, Copy, CopyDetails, CopyQuery},
    policy::CentreScope,
};

use super::catalog::{variant_from_row, SUBTYPE_COLUMNS, SUBTYPE_JOINS};

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get copy by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Copy> {
        sqlx::query_as::<_, Copy>("SELECT * FROM copies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::copy_not_found(id))
    }

    /// Create a copy, assigning the next registration code for the current
    /// year. The per-year counter row is incremented atomically inside the
    /// same transaction as the insert, so two concurrent creations cannot
    /// observe the same sequence number; the UNIQUE constraint on the code
    /// is the final backstop and surfaces as a conflict.
    pub async fn create(&self, entry_id: i32, centre_id: i32) -> AppResult<Copy> {
        let year = Utc::now().year();
        let mut tx = self.pool.begin().await?;

        let sequence: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO registration_counters (year, last_value)
            VALUES ($1, 1)
            ON CONFLICT (year)
            DO UPDATE SET last_value = registration_counters.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(year)
        .fetch_one(&mut *tx)
        .await?;

        let code = format_registration_code(year, sequence);

        let copy = sqlx::query_as::<_, Copy>(
            r#"
            INSERT INTO copies (entry_id, centre_id, registration_code)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(entry_id)
        .bind(centre_id)
        .bind(&code)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint_violation(e, "registration code"))?;

        tx.commit().await?;

        Ok(copy)
    }

    /// List copies with their resolved catalog entry, restricted by the
    /// actor's centre scope. The query matches title/author/registration-code
    /// substrings; a query that parses as a registration code (padded or
    /// not) is normalized and matched exactly as well.
    pub async fn list(&self, query: &CopyQuery, scope: CentreScope) -> AppResult<Vec<CopyDetails>> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

        let trimmed = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
        let pattern = trimmed.map(|q| format!("%{}%", q));
        let exact = trimmed
            .and_then(parse_registration_code)
            .map(|(year, sequence)| format_registration_code(year, sequence));

        let sql = format!(
            r#"
            SELECT c.id AS copy_id, c.registration_code, c.excluded_from_loan,
                   c.decommissioned, c.centre_id, ct.name AS centre_name,
                   e.id, e.title, e.author, {SUBTYPE_COLUMNS}
            FROM copies c
            JOIN catalog_entries e ON e.id = c.entry_id
            JOIN centres ct ON ct.id = c.centre_id
            {SUBTYPE_JOINS}
            WHERE ($1::text IS NULL
                   OR e.title ILIKE $1 OR e.author ILIKE $1
                   OR c.registration_code ILIKE $1
                   OR c.registration_code = $2::text)
              AND ($3::int IS NULL OR c.centre_id = $3)
              AND ($4::int IS NULL OR c.entry_id = $4)
            ORDER BY c.registration_code
            LIMIT $5 OFFSET $6
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(&pattern)
            .bind(&exact)
            .bind(scope.centre_filter())
            .bind(query.entry_id)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Set the decommissioned flag. Permanent in intended use, but the
    /// inverse is not forbidden at this level.
    pub async fn set_decommissioned(&self, id: i32, value: bool) -> AppResult<Copy> {
        sqlx::query_as::<_, Copy>(
            "UPDATE copies SET decommissioned = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::copy_not_found(id))
    }

    /// Set the excluded-from-loan flag
    pub async fn set_excluded(&self, id: i32, value: bool) -> AppResult<Copy> {
        sqlx::query_as::<_, Copy>(
            "UPDATE copies SET excluded_from_loan = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::copy_not_found(id))
    }

    /// Delete a copy
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM copies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::copy_not_found(id));
        }
        Ok(())
    }
}

fn details_from_row(row: &PgRow) -> CopyDetails {
    CopyDetails {
        id: row.get("copy_id"),
        registration_code: row.get("registration_code"),
        excluded_from_loan: row.get("excluded_from_loan"),
        decommissioned: row.get("decommissioned"),
        centre_id: row.get("centre_id"),
        centre_name: row.get("centre_name"),
        entry_id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        variant: variant_from_row(row),
    }
}
