//! Catalog entry model and the subtype variant union.
//!
//! A catalog entry is exactly one of six media kinds. The database keeps one
//! extension table per kind keyed by the entry id; [`SubtypeProbe::resolve`]
//! is the single place that turns the joined extension rows into a
//! [`CatalogVariant`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Book extension fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookDetail {
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub collection: Option<String>,
    pub place: Option<String>,
    pub country_id: Option<i32>,
    pub language_id: Option<i32>,
    pub issue_number: Option<i32>,
    pub volumes: Option<i32>,
    pub pages: Option<i32>,
    pub info_url: Option<String>,
    pub preview_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Magazine extension fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MagazineDetail {
    pub issn: Option<String>,
    pub publisher: Option<String>,
    pub place: Option<String>,
    pub country_id: Option<i32>,
    pub language_id: Option<i32>,
    pub issue_number: Option<i32>,
    pub volumes: Option<i32>,
    pub pages: Option<i32>,
}

/// CD extension fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CdDetail {
    pub label: Option<String>,
    pub style: Option<String>,
    pub duration_minutes: Option<i32>,
}

/// DVD / Blu-ray extension fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VideoDetail {
    pub studio: Option<String>,
    pub duration_minutes: Option<i32>,
}

/// Device extension fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeviceDetail {
    pub brand: Option<String>,
    pub model: Option<String>,
}

/// The concrete kind of a catalog entry, with its kind-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CatalogVariant {
    Book(BookDetail),
    Magazine(MagazineDetail),
    Cd(CdDetail),
    Dvd(VideoDetail),
    #[serde(rename = "bluray")]
    BluRay(VideoDetail),
    Device(DeviceDetail),
    /// Entry extends no subtype table (legacy data)
    Unspecified,
}

impl Default for CatalogVariant {
    fn default() -> Self {
        CatalogVariant::Unspecified
    }
}

impl CatalogVariant {
    /// Short kind tag used in listings and suggestions
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogVariant::Book(_) => "book",
            CatalogVariant::Magazine(_) => "magazine",
            CatalogVariant::Cd(_) => "cd",
            CatalogVariant::Dvd(_) => "dvd",
            CatalogVariant::BluRay(_) => "bluray",
            CatalogVariant::Device(_) => "device",
            CatalogVariant::Unspecified => "unspecified",
        }
    }
}

/// Extension rows joined for one entry, at most one expected to be present.
///
/// Resolution order is fixed: Book, Magazine, CD, DVD, Blu-ray, Device. The
/// first present row wins, so behavior stays deterministic even if the
/// one-extension-per-entry invariant is ever violated in the data.
#[derive(Debug, Default)]
pub struct SubtypeProbe {
    pub book: Option<BookDetail>,
    pub magazine: Option<MagazineDetail>,
    pub cd: Option<CdDetail>,
    pub dvd: Option<VideoDetail>,
    pub bluray: Option<VideoDetail>,
    pub device: Option<DeviceDetail>,
}

impl SubtypeProbe {
    pub fn resolve(self) -> CatalogVariant {
        if let Some(b) = self.book {
            CatalogVariant::Book(b)
        } else if let Some(m) = self.magazine {
            CatalogVariant::Magazine(m)
        } else if let Some(c) = self.cd {
            CatalogVariant::Cd(c)
        } else if let Some(d) = self.dvd {
            CatalogVariant::Dvd(d)
        } else if let Some(b) = self.bluray {
            CatalogVariant::BluRay(b)
        } else if let Some(d) = self.device {
            CatalogVariant::Device(d)
        } else {
            CatalogVariant::Unspecified
        }
    }
}

/// Per-entry copy availability counts. The three buckets are disjoint and
/// together cover every copy of the entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CopyCounts {
    /// Not excluded from loan, not decommissioned
    pub available: i64,
    /// Excluded from loan but not decommissioned
    pub excluded: i64,
    pub decommissioned: i64,
}

impl CopyCounts {
    pub fn total(&self) -> i64 {
        self.available + self.excluded + self.decommissioned
    }
}

/// Common catalog fields, as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CatalogEntry {
    pub id: i32,
    pub title: String,
    pub original_title: Option<String>,
    pub author: Option<String>,
    /// Universal decimal classification code
    pub cdu: Option<String>,
    /// Shelf signature
    pub signature: Option<String>,
    pub edition_date: Option<NaiveDate>,
    pub summary: Option<String>,
    pub annotations: Option<String>,
    pub dimensions: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[sqlx(skip)]
    #[serde(default)]
    pub category_ids: Vec<i32>,
    #[sqlx(skip)]
    #[serde(default)]
    pub variant: CatalogVariant,
}

/// Search result line
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogSummary {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    #[serde(flatten)]
    pub variant: CatalogVariant,
    pub copies: CopyCounts,
}

/// Autocomplete suggestion line
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Suggestion {
    pub id: Option<i32>,
    pub title: String,
    pub author: Option<String>,
    pub kind: String,
    /// True when the suggestion came from the external bibliographic lookup
    #[serde(default)]
    pub external: bool,
}

/// Create catalog entry request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCatalogEntry {
    pub title: String,
    pub original_title: Option<String>,
    pub author: Option<String>,
    pub cdu: Option<String>,
    pub signature: Option<String>,
    pub edition_date: Option<NaiveDate>,
    pub summary: Option<String>,
    pub annotations: Option<String>,
    pub dimensions: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i32>,
    pub variant: CatalogVariant,
}

/// Catalog search parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct CatalogQuery {
    /// Case-insensitive substring matched against title and author
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_resolves_in_priority_order() {
        // An entry wrongly extending both book and cd resolves as book.
        let probe = SubtypeProbe {
            book: Some(BookDetail {
                isbn: Some("9781234567890".into()),
                ..Default::default()
            }),
            cd: Some(CdDetail::default()),
            ..Default::default()
        };
        assert!(matches!(probe.resolve(), CatalogVariant::Book(_)));

        let probe = SubtypeProbe {
            bluray: Some(VideoDetail::default()),
            device: Some(DeviceDetail::default()),
            ..Default::default()
        };
        assert!(matches!(probe.resolve(), CatalogVariant::BluRay(_)));
    }

    #[test]
    fn probe_without_extension_is_unspecified() {
        assert_eq!(SubtypeProbe::default().resolve(), CatalogVariant::Unspecified);
    }

    #[test]
    fn copy_counts_partition_total() {
        let counts = CopyCounts {
            available: 3,
            excluded: 1,
            decommissioned: 2,
        };
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn variant_kind_tags() {
        assert_eq!(CatalogVariant::Dvd(VideoDetail::default()).kind(), "dvd");
        assert_eq!(CatalogVariant::BluRay(VideoDetail::default()).kind(), "bluray");
        assert_eq!(CatalogVariant::Unspecified.kind(), "unspecified");
    }
}
