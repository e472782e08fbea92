//! Copy (physical exemplar) model and registration codes

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::catalog::CatalogVariant;

static REGISTRATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^EX-(\d{4})-(\d{1,6})$").unwrap());

/// Format a registration code from its year and sequence number.
/// Codes look like `EX-2026-000042` and sort lexicographically by
/// (year, sequence).
pub fn format_registration_code(year: i32, sequence: i32) -> String {
    format!("EX-{}-{:06}", year, sequence)
}

/// Parse a registration code back into (year, sequence), if well formed.
/// The sequence may be given unpadded, so user-typed codes like
/// `EX-2026-42` normalize to their canonical form via
/// [`format_registration_code`].
pub fn parse_registration_code(code: &str) -> Option<(i32, i32)> {
    let caps = REGISTRATION_RE.captures(code)?;
    let year = caps.get(1)?.as_str().parse().ok()?;
    let seq = caps.get(2)?.as_str().parse().ok()?;
    Some((year, seq))
}

/// A physical copy of a catalog entry, owned by one centre
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Copy {
    pub id: i32,
    pub entry_id: i32,
    pub centre_id: i32,
    /// Immutable, globally unique, assigned at creation
    pub registration_code: String,
    pub excluded_from_loan: bool,
    pub decommissioned: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Copy {
    /// A copy is loanable when neither flag is set
    pub fn is_loanable(&self) -> bool {
        !self.excluded_from_loan && !self.decommissioned
    }
}

/// Copy listing line with its resolved catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CopyDetails {
    pub id: i32,
    pub registration_code: String,
    pub excluded_from_loan: bool,
    pub decommissioned: bool,
    pub centre_id: i32,
    pub centre_name: Option<String>,
    pub entry_id: i32,
    pub title: String,
    pub author: Option<String>,
    #[serde(flatten)]
    pub variant: CatalogVariant,
}

/// Create copy request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCopy {
    pub entry_id: i32,
    /// Ignored for non-superuser staff, who always create in their own centre
    pub centre_id: Option<i32>,
}

/// Copy listing parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct CopyQuery {
    /// Substring matched against title/author/registration code; a
    /// well-formed registration code also matches exactly after
    /// normalization
    pub q: Option<String>,
    pub entry_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_fixed_width() {
        assert_eq!(format_registration_code(2026, 7), "EX-2026-000007");
        assert_eq!(format_registration_code(2026, 123456), "EX-2026-123456");
    }

    #[test]
    fn codes_sort_by_sequence_within_a_year() {
        let a = format_registration_code(2026, 99);
        let b = format_registration_code(2026, 100);
        assert!(a < b);
    }

    #[test]
    fn parse_round_trip() {
        assert_eq!(parse_registration_code("EX-2025-000312"), Some((2025, 312)));
        assert_eq!(parse_registration_code("EX-25-000312"), None);
        assert_eq!(parse_registration_code("REG-2025-000312"), None);
        assert_eq!(parse_registration_code("EX-2025-0000312"), None);
    }

    #[test]
    fn unpadded_codes_normalize_to_canonical_form() {
        let (year, seq) = parse_registration_code("EX-2026-42").unwrap();
        assert_eq!(format_registration_code(year, seq), "EX-2026-000042");
    }

    #[test]
    fn loanable_needs_both_flags_clear() {
        let mut copy = Copy {
            id: 1,
            entry_id: 1,
            centre_id: 1,
            registration_code: format_registration_code(2026, 1),
            excluded_from_loan: false,
            decommissioned: false,
            created_at: None,
        };
        assert!(copy.is_loanable());
        copy.excluded_from_loan = true;
        assert!(!copy.is_loanable());
        copy.excluded_from_loan = false;
        copy.decommissioned = true;
        assert!(!copy.is_loanable());
    }
}
