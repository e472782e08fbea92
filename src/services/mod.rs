//! Business logic services

pub mod bibliographic;
pub mod catalog;
pub mod copies;
pub mod loans;
pub mod users;

use crate::{
    config::{AuthConfig, BibliographicConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub copies: copies::CopiesService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        bibliographic_config: &BibliographicConfig,
    ) -> Self {
        let bibliographic = bibliographic::BibliographicService::new(bibliographic_config);
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), bibliographic),
            copies: copies::CopiesService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            users: users::UsersService::new(repository, auth_config),
        }
    }
}
