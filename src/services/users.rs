//! User directory service: authentication, administration and bulk import

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, Rng, RngCore};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        log::LogLevel,
        user::{
            CreateUser, ImportReport, ImportUserRecord, UpdateUser, User, UserQuery, UserShort,
        },
    },
    policy,
    repository::{reference::RefKind, Repository},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Verify credentials and hand out a fresh bearer token. The token
    /// replaces any previous one for the account.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.generate_token();
        self.repository.users.set_token(user.id, &token).await?;

        Ok((token, user))
    }

    /// Resolve a bearer token to its user
    pub async fn user_for_token(&self, token: &str) -> AppResult<User> {
        self.repository
            .users
            .get_by_token(token)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid token".to_string()))
    }

    pub async fn get(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Create a user. Staff accounts must carry a centre from the start.
    pub async fn create(&self, actor: &User, request: &CreateUser) -> AppResult<User> {
        policy::require_staff(actor)?;
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if (request.is_staff || request.is_superuser) && request.centre_id.is_none() {
            return Err(AppError::Validation(
                "Staff users must have a centre assigned".to_string(),
            ));
        }

        let password_hash = match &request.password {
            Some(p) => Some(self.hash_password(p)?),
            None => None,
        };

        self.repository
            .users
            .create(request, password_hash.as_deref())
            .await
    }

    /// Partial update. Promoting an existing account to staff requires a
    /// centre; the check only fires on the transition, existing staff rows
    /// without a centre are left alone.
    pub async fn update(&self, actor: &User, id: i32, update: &UpdateUser) -> AppResult<User> {
        policy::require_staff(actor)?;
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let existing = self.repository.users.get_by_id(id).await?;

        let becoming_staff = update.is_staff == Some(true) && !existing.is_staff;
        if becoming_staff && update.centre_id.or(existing.centre_id).is_none() {
            return Err(AppError::Validation(
                "Staff users must have a centre assigned".to_string(),
            ));
        }

        self.repository.users.update(id, update).await
    }

    pub async fn delete(&self, actor: &User, id: i32) -> AppResult<()> {
        policy::require_staff(actor)?;
        self.repository.users.delete(id).await
    }

    /// Search users within the actor's centre scope
    pub async fn search(&self, actor: &User, query: &UserQuery) -> AppResult<Vec<UserShort>> {
        policy::require_staff(actor)?;
        self.repository.users.search(query, policy::scope_for(actor)).await
    }

    /// Borrower candidates for the loan form
    pub async fn list_borrowers(&self, actor: &User) -> AppResult<Vec<UserShort>> {
        policy::require_staff(actor)?;
        self.repository
            .users
            .list_borrowers(actor.id, policy::scope_for(actor))
            .await
    }

    /// Bulk import. Every record is processed independently; duplicates and
    /// bad rows are counted and reported, never abort the batch.
    pub async fn import(&self, actor: &User, records: &[ImportUserRecord]) -> AppResult<ImportReport> {
        policy::require_staff(actor)?;

        let mut report = ImportReport::default();

        for record in records {
            match self.import_one(record).await {
                Ok(()) => report.record_created(),
                Err(AppError::Database(e)) => {
                    // Unexpected store failure: report and keep going
                    tracing::error!("Import failed for {}: {:?}", record.email, e);
                    report.record_error(&record.email, "database error");
                }
                Err(e) => report.record_error(&record.email, e.to_string()),
            }
        }

        self.repository
            .logs
            .append(
                &actor.username,
                &format!(
                    "User import: {} created, {} errors",
                    report.created, report.errors
                ),
                if report.errors > 0 { LogLevel::Warning } else { LogLevel::Info },
            )
            .await?;

        Ok(report)
    }

    async fn import_one(&self, record: &ImportUserRecord) -> AppResult<()> {
        if record.email.trim().is_empty() {
            return Err(AppError::Validation("email is required".to_string()));
        }
        if self.repository.users.email_exists(&record.email).await? {
            return Err(AppError::Conflict("email already registered".to_string()));
        }
        if let Some(phone) = record.phone.as_deref().filter(|p| !p.is_empty()) {
            if self.repository.users.phone_exists(phone).await? {
                return Err(AppError::Conflict("phone already registered".to_string()));
            }
        }

        let centre_id = match record.centre.as_deref().filter(|c| !c.is_empty()) {
            Some(name) => Some(
                self.repository
                    .reference
                    .get_or_create(RefKind::Centre, name)
                    .await?
                    .id,
            ),
            None => None,
        };
        let group_id = match record.group.as_deref().filter(|g| !g.is_empty()) {
            Some(name) => Some(
                self.repository
                    .reference
                    .get_or_create(RefKind::Group, name)
                    .await?
                    .id,
            ),
            None => None,
        };

        // Imported accounts start with a random temporary password
        let temp_password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect();
        let password_hash = self.hash_password(&temp_password)?;

        let create = CreateUser {
            username: record.email.clone(),
            email: record.email.clone(),
            password: None,
            first_name: Some(record.first_name.clone()),
            last_name: record.full_last_name(),
            phone: record.phone.clone().filter(|p| !p.is_empty()),
            centre_id,
            group_id,
            is_staff: false,
            is_superuser: false,
        };

        self.repository
            .users
            .create(&create, Some(&password_hash))
            .await?;

        Ok(())
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let Some(hash) = user.password_hash.as_deref() else {
            return Ok(false);
        };
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Stored hash invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn generate_token(&self) -> String {
        let mut bytes = vec![0u8; self.config.token_bytes.max(16)];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}
