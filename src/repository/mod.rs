//! Repository layer for database operations

pub mod catalog;
pub mod copies;
pub mod loans;
pub mod logs;
pub mod reference;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub catalog: catalog::CatalogRepository,
    pub copies: copies::CopiesRepository,
    pub loans: loans::LoansRepository,
    pub users: users::UsersRepository,
    pub reference: reference::ReferenceRepository,
    pub logs: logs::LogsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            catalog: catalog::CatalogRepository::new(pool.clone()),
            copies: copies::CopiesRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            reference: reference::ReferenceRepository::new(pool.clone()),
            logs: logs::LogsRepository::new(pool.clone()),
            pool,
        }
    }
}
