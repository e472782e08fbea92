//! Copy registry service

use crate::{
    error::{AppError, AppResult},
    models::{
        copy::{Copy, CopyDetails, CopyQuery, CreateCopy},
        log::LogLevel,
        user::User,
    },
    policy,
    repository::Repository,
};

#[derive(Clone)]
pub struct CopiesService {
    repository: Repository,
}

impl CopiesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new copy of a catalog entry. Non-superuser staff always
    /// create copies in their own centre, whatever the request says.
    pub async fn create(&self, actor: &User, request: &CreateCopy) -> AppResult<Copy> {
        policy::require_staff(actor)?;

        // Validate the entry exists before burning a sequence number
        self.repository.catalog.get_by_id(request.entry_id).await?;

        let centre_id = if actor.is_superuser {
            request
                .centre_id
                .or(actor.centre_id)
                .ok_or_else(|| AppError::Validation("centre_id is required".to_string()))?
        } else {
            actor
                .centre_id
                .or(request.centre_id)
                .ok_or_else(|| AppError::Validation("centre_id is required".to_string()))?
        };
        policy::require_in_scope(actor, centre_id)?;

        let copy = self.repository.copies.create(request.entry_id, centre_id).await?;

        self.repository
            .logs
            .append(
                &actor.username,
                &format!("Copy {} registered", copy.registration_code),
                LogLevel::Info,
            )
            .await?;

        Ok(copy)
    }

    /// List copies visible to the actor
    pub async fn list(&self, actor: &User, query: &CopyQuery) -> AppResult<Vec<CopyDetails>> {
        policy::require_staff(actor)?;
        self.repository.copies.list(query, policy::scope_for(actor)).await
    }

    /// Mark a copy decommissioned. Permanent in intended use.
    pub async fn decommission(&self, actor: &User, copy_id: i32) -> AppResult<Copy> {
        let copy = self.checked_copy(actor, copy_id).await?;

        let updated = self.repository.copies.set_decommissioned(copy.id, true).await?;
        self.repository
            .logs
            .append(
                &actor.username,
                &format!("Copy {} decommissioned", updated.registration_code),
                LogLevel::Warning,
            )
            .await?;
        Ok(updated)
    }

    /// Manually exclude a copy from loan
    pub async fn exclude_from_loan(&self, actor: &User, copy_id: i32) -> AppResult<Copy> {
        let copy = self.checked_copy(actor, copy_id).await?;
        self.repository.copies.set_excluded(copy.id, true).await
    }

    /// Make a copy loanable again
    pub async fn restore(&self, actor: &User, copy_id: i32) -> AppResult<Copy> {
        let copy = self.checked_copy(actor, copy_id).await?;
        self.repository.copies.set_excluded(copy.id, false).await
    }

    /// Fetch a copy and verify the actor may mutate it
    async fn checked_copy(&self, actor: &User, copy_id: i32) -> AppResult<Copy> {
        policy::require_staff(actor)?;
        let copy = self.repository.copies.get_by_id(copy_id).await?;
        policy::require_in_scope(actor, copy.centre_id)?;
        Ok(copy)
    }
}
