//! Data models for the Mediateca server

pub mod catalog;
pub mod copy;
pub mod loan;
pub mod log;
pub mod reference;
pub mod user;

// Re-export commonly used types
pub use catalog::{CatalogEntry, CatalogSummary, CatalogVariant, CopyCounts};
pub use copy::{Copy, CopyDetails};
pub use loan::{Loan, LoanDetails, Reservation};
pub use log::{AuditLog, LogLevel};
pub use user::{User, UserShort};
