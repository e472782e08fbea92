//! Audit log repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::log::{AuditLog, LogLevel},
};

#[derive(Clone)]
pub struct LogsRepository {
    pool: Pool<Postgres>,
}

impl LogsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an entry. Failures are reported but the log is best effort
    /// for callers outside a transaction.
    pub async fn append(&self, actor: &str, action: &str, level: LogLevel) -> AppResult<()> {
        sqlx::query("INSERT INTO audit_logs (actor, action, level) VALUES ($1, $2, $3)")
            .bind(actor)
            .bind(action)
            .bind(level.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Most recent entries first
    pub async fn list(&self, limit: i64) -> AppResult<Vec<AuditLog>> {
        let rows = sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs ORDER BY logged_at DESC, id DESC LIMIT $1",
        )
        .bind(limit.clamp(1, 1000))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
