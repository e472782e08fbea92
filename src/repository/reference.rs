//! Reference-data repository: countries, languages, categories, centres, groups

use sqlx::{Pool, Postgres};

use crate::{
    error::{map_constraint_violation, AppError, AppResult, ErrorCode},
    models::reference::{Category, NamedRef},
};

/// Flat lookup tables handled generically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Country,
    Language,
    Centre,
    Group,
}

impl RefKind {
    fn table(&self) -> &'static str {
        match self {
            RefKind::Country => "countries",
            RefKind::Language => "languages",
            RefKind::Centre => "centres",
            RefKind::Group => "user_groups",
        }
    }
}

#[derive(Clone)]
pub struct ReferenceRepository {
    pool: Pool<Postgres>,
}

impl ReferenceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self, kind: RefKind) -> AppResult<Vec<NamedRef>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY name", kind.table());
        let rows = sqlx::query_as::<_, NamedRef>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get(&self, kind: RefKind, id: i32) -> AppResult<NamedRef> {
        let sql = format!("SELECT id, name FROM {} WHERE id = $1", kind.table());
        sqlx::query_as::<_, NamedRef>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{:?} {} not found", kind, id)))
    }

    pub async fn create(&self, kind: RefKind, name: &str) -> AppResult<NamedRef> {
        let sql = format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
            kind.table()
        );
        sqlx::query_as::<_, NamedRef>(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    /// Fetch by name or create, used by the user import
    pub async fn get_or_create(&self, kind: RefKind, name: &str) -> AppResult<NamedRef> {
        let sql = format!("SELECT id, name FROM {} WHERE name = $1", kind.table());
        if let Some(found) = sqlx::query_as::<_, NamedRef>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(found);
        }
        self.create(kind, name).await
    }

    /// Delete a lookup row. Centres still referenced by copies are protected
    /// by the RESTRICT foreign key and refuse deletion with a conflict.
    pub async fn delete(&self, kind: RefKind, id: i32) -> AppResult<()> {
        if kind == RefKind::Centre {
            let in_use: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM copies WHERE centre_id = $1)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
            if in_use {
                return Err(AppError::ConflictCoded {
                    code: ErrorCode::CentreInUse,
                    message: "Centre still has copies registered".to_string(),
                });
            }
        }

        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_constraint_violation(e, "centre"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{:?} {} not found", kind, id)));
        }
        Ok(())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, parent_id FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_category(&self, name: &str, parent_id: Option<i32>) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, parent_id) VALUES ($1, $2) RETURNING id, name, parent_id",
        )
        .bind(name)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_violation(e, "category"))
    }
}
