//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{map_constraint_violation, AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserQuery, UserShort},
    policy::CentreScope,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::user_not_found(id))
    }

    /// Get user by username, case-insensitive
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Resolve a bearer token to its user
    pub async fn get_by_token(&self, token: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE auth_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Check if phone already exists
    pub async fn phone_exists(&self, phone: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)")
                .bind(phone)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a new user. Unique violations on username/email/phone surface
    /// as conflicts.
    pub async fn create(&self, user: &CreateUser, password_hash: Option<&str>) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name,
                               phone, centre_id, group_id, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.centre_id)
        .bind(user.group_id)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_violation(e, "user"))
    }

    /// Apply a partial update, only touching provided fields
    pub async fn update(&self, id: i32, update: &UpdateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                phone = COALESCE($5, phone),
                centre_id = COALESCE($6, centre_id),
                group_id = COALESCE($7, group_id),
                image_url = COALESCE($8, image_url),
                is_staff = COALESCE($9, is_staff),
                is_superuser = COALESCE($10, is_superuser)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.email)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone)
        .bind(update.centre_id)
        .bind(update.group_id)
        .bind(&update.image_url)
        .bind(update.is_staff)
        .bind(update.is_superuser)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_violation(e, "user"))?
        .ok_or_else(|| AppError::user_not_found(id))
    }

    /// Store a freshly generated bearer token on the user row
    pub async fn set_token(&self, id: i32, token: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET auth_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Search users, scoped silently to the actor's centre
    pub async fn search(&self, query: &UserQuery, scope: CentreScope) -> AppResult<Vec<UserShort>> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

        let pattern = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q));

        let users = sqlx::query_as::<_, UserShort>(
            r#"
            SELECT id, username, email, first_name, last_name, centre_id
            FROM users
            WHERE ($1::text IS NULL
                   OR username ILIKE $1 OR email ILIKE $1
                   OR first_name ILIKE $1 OR last_name ILIKE $1)
              AND ($2::int IS NULL OR centre_id = $2)
            ORDER BY username
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&pattern)
        .bind(scope.centre_filter())
        .bind(per_page)
        .bind((page - 1) * per_page)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Users a staff member may lend to: same centre, excluding every staff
    /// account and the actor themselves.
    pub async fn list_borrowers(&self, actor_id: i32, scope: CentreScope) -> AppResult<Vec<UserShort>> {
        let users = sqlx::query_as::<_, UserShort>(
            r#"
            SELECT id, username, email, first_name, last_name, centre_id
            FROM users
            WHERE NOT is_staff AND NOT is_superuser
              AND id != $1
              AND ($2::int IS NULL OR centre_id = $2)
            ORDER BY username
            "#,
        )
        .bind(actor_id)
        .bind(scope.centre_filter())
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Delete a user
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::user_not_found(id));
        }
        Ok(())
    }
}
