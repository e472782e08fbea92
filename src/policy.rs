//! Centre-scoped access control.
//!
//! Staff accounts only see and mutate copies, loans and borrowers belonging
//! to their own centre; superusers are unscoped. Every endpoint goes through
//! [`scope_for`] instead of filtering ad hoc: listings apply the scope
//! silently, mutations on an out-of-scope resource fail with an
//! authorization error.

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

/// Visibility scope derived from the acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentreScope {
    /// Superuser, or staff without centre legacy accounts: no filtering
    Unrestricted,
    /// Restricted to a single centre
    Centre(i32),
}

impl CentreScope {
    /// Whether a resource in `centre_id` is visible under this scope
    pub fn allows(&self, centre_id: i32) -> bool {
        match self {
            CentreScope::Unrestricted => true,
            CentreScope::Centre(own) => *own == centre_id,
        }
    }

    /// The centre id to filter listings by, if any
    pub fn centre_filter(&self) -> Option<i32> {
        match self {
            CentreScope::Unrestricted => None,
            CentreScope::Centre(id) => Some(*id),
        }
    }
}

/// Derive the scope for an acting staff user
pub fn scope_for(actor: &User) -> CentreScope {
    if actor.is_superuser {
        return CentreScope::Unrestricted;
    }
    match actor.centre_id {
        Some(id) => CentreScope::Centre(id),
        // Legacy staff rows without a centre stay unscoped
        None => CentreScope::Unrestricted,
    }
}

/// Reject any actor that is not staff
pub fn require_staff(actor: &User) -> AppResult<()> {
    if actor.is_staff || actor.is_superuser {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Staff account required".to_string(),
        ))
    }
}

/// Reject mutation of a resource outside the actor's centre
pub fn require_in_scope(actor: &User, centre_id: i32) -> AppResult<()> {
    if scope_for(actor).allows(centre_id) {
        Ok(())
    } else {
        Err(AppError::wrong_centre())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(centre_id: Option<i32>, is_superuser: bool) -> User {
        User {
            id: 1,
            username: "staff".into(),
            email: "staff@example.org".into(),
            password_hash: None,
            first_name: None,
            last_name: None,
            phone: None,
            centre_id,
            group_id: None,
            image_url: None,
            auth_token: None,
            is_staff: true,
            is_superuser,
            is_librarian: false,
            created_at: None,
        }
    }

    #[test]
    fn superuser_is_unrestricted() {
        assert_eq!(scope_for(&staff(Some(3), true)), CentreScope::Unrestricted);
        assert!(require_in_scope(&staff(Some(3), true), 9).is_ok());
    }

    #[test]
    fn staff_scoped_to_own_centre() {
        let actor = staff(Some(3), false);
        assert_eq!(scope_for(&actor), CentreScope::Centre(3));
        assert!(require_in_scope(&actor, 3).is_ok());
        assert!(require_in_scope(&actor, 4).is_err());
    }

    #[test]
    fn centre_filter_drives_listings() {
        assert_eq!(scope_for(&staff(Some(3), false)).centre_filter(), Some(3));
        assert_eq!(scope_for(&staff(None, true)).centre_filter(), None);
    }

    #[test]
    fn non_staff_rejected() {
        let mut user = staff(Some(1), false);
        user.is_staff = false;
        assert!(require_staff(&user).is_err());
        assert!(require_staff(&staff(None, false)).is_ok());
    }
}
