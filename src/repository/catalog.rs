//! Catalog repository: search, subtype resolution and entry persistence

use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    error::{map_constraint_violation, AppError, AppResult},
    models::catalog::{
        BookDetail, CatalogEntry, CatalogQuery, CatalogSummary, CatalogVariant, CdDetail,
        CopyCounts, CreateCatalogEntry, DeviceDetail, MagazineDetail, SubtypeProbe, VideoDetail,
    },
};

/// LEFT JOIN clause against the six subtype extension tables. Shared by the
/// catalog search, the suggestion query and the copy listing so subtype
/// resolution behaves identically everywhere.
pub(crate) const SUBTYPE_JOINS: &str = r#"
    LEFT JOIN books b ON b.entry_id = e.id
    LEFT JOIN magazines mg ON mg.entry_id = e.id
    LEFT JOIN cds cd ON cd.entry_id = e.id
    LEFT JOIN dvds dv ON dv.entry_id = e.id
    LEFT JOIN blurays br ON br.entry_id = e.id
    LEFT JOIN devices dev ON dev.entry_id = e.id
"#;

/// Column list matching [`variant_from_row`], aliased to avoid collisions
/// between extension tables.
pub(crate) const SUBTYPE_COLUMNS: &str = r#"
    b.entry_id AS book_id, b.isbn, b.publisher AS book_publisher,
    b.collection AS book_collection, b.place AS book_place,
    b.country_id AS book_country_id, b.language_id AS book_language_id,
    b.issue_number AS book_issue_number, b.volumes AS book_volumes,
    b.pages AS book_pages, b.info_url, b.preview_url, b.thumbnail_url,
    mg.entry_id AS magazine_id, mg.issn, mg.publisher AS magazine_publisher,
    mg.place AS magazine_place, mg.country_id AS magazine_country_id,
    mg.language_id AS magazine_language_id,
    mg.issue_number AS magazine_issue_number, mg.volumes AS magazine_volumes,
    mg.pages AS magazine_pages,
    cd.entry_id AS cd_id, cd.label AS cd_label, cd.style AS cd_style,
    cd.duration_minutes AS cd_duration,
    dv.entry_id AS dvd_id, dv.studio AS dvd_studio,
    dv.duration_minutes AS dvd_duration,
    br.entry_id AS bluray_id, br.studio AS bluray_studio,
    br.duration_minutes AS bluray_duration,
    dev.entry_id AS device_id, dev.brand AS device_brand,
    dev.model AS device_model
"#;

/// Build the subtype probe from a row selected with [`SUBTYPE_COLUMNS`],
/// then resolve it to the concrete variant.
pub(crate) fn variant_from_row(row: &PgRow) -> CatalogVariant {
    let mut probe = SubtypeProbe::default();
    if row.get::<Option<i32>, _>("book_id").is_some() {
        probe.book = Some(BookDetail {
            isbn: row.get("isbn"),
            publisher: row.get("book_publisher"),
            collection: row.get("book_collection"),
            place: row.get("book_place"),
            country_id: row.get("book_country_id"),
            language_id: row.get("book_language_id"),
            issue_number: row.get("book_issue_number"),
            volumes: row.get("book_volumes"),
            pages: row.get("book_pages"),
            info_url: row.get("info_url"),
            preview_url: row.get("preview_url"),
            thumbnail_url: row.get("thumbnail_url"),
        });
    }
    if row.get::<Option<i32>, _>("magazine_id").is_some() {
        probe.magazine = Some(MagazineDetail {
            issn: row.get("issn"),
            publisher: row.get("magazine_publisher"),
            place: row.get("magazine_place"),
            country_id: row.get("magazine_country_id"),
            language_id: row.get("magazine_language_id"),
            issue_number: row.get("magazine_issue_number"),
            volumes: row.get("magazine_volumes"),
            pages: row.get("magazine_pages"),
        });
    }
    if row.get::<Option<i32>, _>("cd_id").is_some() {
        probe.cd = Some(CdDetail {
            label: row.get("cd_label"),
            style: row.get("cd_style"),
            duration_minutes: row.get("cd_duration"),
        });
    }
    if row.get::<Option<i32>, _>("dvd_id").is_some() {
        probe.dvd = Some(VideoDetail {
            studio: row.get("dvd_studio"),
            duration_minutes: row.get("dvd_duration"),
        });
    }
    if row.get::<Option<i32>, _>("bluray_id").is_some() {
        probe.bluray = Some(VideoDetail {
            studio: row.get("bluray_studio"),
            duration_minutes: row.get("bluray_duration"),
        });
    }
    if row.get::<Option<i32>, _>("device_id").is_some() {
        probe.device = Some(DeviceDetail {
            brand: row.get("device_brand"),
            model: row.get("device_model"),
        });
    }
    probe.resolve()
}

/// Disjoint per-entry copy buckets, selected alongside the entry
const COPY_COUNT_COLUMNS: &str = r#"
    (SELECT COUNT(*) FROM copies c WHERE c.entry_id = e.id
        AND NOT c.excluded_from_loan AND NOT c.decommissioned) AS n_available,
    (SELECT COUNT(*) FROM copies c WHERE c.entry_id = e.id
        AND c.excluded_from_loan AND NOT c.decommissioned) AS n_excluded,
    (SELECT COUNT(*) FROM copies c WHERE c.entry_id = e.id
        AND c.decommissioned) AS n_decommissioned
"#;

#[derive(Clone)]
pub struct CatalogRepository {
    pool: Pool<Postgres>,
}

impl CatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search the catalog. An empty or missing query returns everything,
    /// ordered by title; a non-matching query returns an empty list.
    pub async fn search(&self, query: &CatalogQuery) -> AppResult<Vec<CatalogSummary>> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

        let pattern = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q));

        let sql = format!(
            r#"
            SELECT e.id, e.title, e.author, {SUBTYPE_COLUMNS}, {COPY_COUNT_COLUMNS}
            FROM catalog_entries e {SUBTYPE_JOINS}
            WHERE ($1::text IS NULL OR e.title ILIKE $1 OR e.author ILIKE $1)
            ORDER BY e.title, e.id
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(&pattern)
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(summary_from_row).collect())
    }

    /// Suggestion candidates: title/author substring match, capped
    pub async fn suggest(&self, q: &str, limit: i64) -> AppResult<Vec<CatalogSummary>> {
        let pattern = format!("%{}%", q);
        let sql = format!(
            r#"
            SELECT e.id, e.title, e.author, {SUBTYPE_COLUMNS}, {COPY_COUNT_COLUMNS}
            FROM catalog_entries e {SUBTYPE_JOINS}
            WHERE e.title ILIKE $1 OR e.author ILIKE $1
            ORDER BY e.title, e.id
            LIMIT $2
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(summary_from_row).collect())
    }

    /// Get one entry with its variant and category tags
    pub async fn get_by_id(&self, id: i32) -> AppResult<CatalogEntry> {
        let sql = format!(
            r#"
            SELECT e.*, {SUBTYPE_COLUMNS}
            FROM catalog_entries e {SUBTYPE_JOINS}
            WHERE e.id = $1
            "#
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Catalog entry {} not found", id)))?;

        let category_ids: Vec<i32> = sqlx::query_scalar(
            "SELECT category_id FROM catalog_entry_categories WHERE entry_id = $1 ORDER BY category_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CatalogEntry {
            id: row.get("id"),
            title: row.get("title"),
            original_title: row.get("original_title"),
            author: row.get("author"),
            cdu: row.get("cdu"),
            signature: row.get("signature"),
            edition_date: row.get("edition_date"),
            summary: row.get("summary"),
            annotations: row.get("annotations"),
            dimensions: row.get("dimensions"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            category_ids,
            variant: variant_from_row(&row),
        })
    }

    /// Create an entry together with its subtype extension row and tags,
    /// in one transaction.
    pub async fn create(&self, entry: &CreateCatalogEntry) -> AppResult<CatalogEntry> {
        let mut tx = self.pool.begin().await?;

        let entry_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO catalog_entries
                (title, original_title, author, cdu, signature, edition_date,
                 summary, annotations, dimensions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&entry.title)
        .bind(&entry.original_title)
        .bind(&entry.author)
        .bind(&entry.cdu)
        .bind(&entry.signature)
        .bind(entry.edition_date)
        .bind(&entry.summary)
        .bind(&entry.annotations)
        .bind(&entry.dimensions)
        .fetch_one(&mut *tx)
        .await?;

        match &entry.variant {
            CatalogVariant::Book(b) => {
                sqlx::query(
                    r#"
                    INSERT INTO books (entry_id, isbn, publisher, collection, place,
                        country_id, language_id, issue_number, volumes, pages,
                        info_url, preview_url, thumbnail_url)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                    "#,
                )
                .bind(entry_id)
                .bind(&b.isbn)
                .bind(&b.publisher)
                .bind(&b.collection)
                .bind(&b.place)
                .bind(b.country_id)
                .bind(b.language_id)
                .bind(b.issue_number)
                .bind(b.volumes)
                .bind(b.pages)
                .bind(&b.info_url)
                .bind(&b.preview_url)
                .bind(&b.thumbnail_url)
                .execute(&mut *tx)
                .await?;
            }
            CatalogVariant::Magazine(m) => {
                sqlx::query(
                    r#"
                    INSERT INTO magazines (entry_id, issn, publisher, place,
                        country_id, language_id, issue_number, volumes, pages)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                    "#,
                )
                .bind(entry_id)
                .bind(&m.issn)
                .bind(&m.publisher)
                .bind(&m.place)
                .bind(m.country_id)
                .bind(m.language_id)
                .bind(m.issue_number)
                .bind(m.volumes)
                .bind(m.pages)
                .execute(&mut *tx)
                .await?;
            }
            CatalogVariant::Cd(c) => {
                sqlx::query(
                    "INSERT INTO cds (entry_id, label, style, duration_minutes) VALUES ($1, $2, $3, $4)",
                )
                .bind(entry_id)
                .bind(&c.label)
                .bind(&c.style)
                .bind(c.duration_minutes)
                .execute(&mut *tx)
                .await?;
            }
            CatalogVariant::Dvd(v) => {
                sqlx::query(
                    "INSERT INTO dvds (entry_id, studio, duration_minutes) VALUES ($1, $2, $3)",
                )
                .bind(entry_id)
                .bind(&v.studio)
                .bind(v.duration_minutes)
                .execute(&mut *tx)
                .await?;
            }
            CatalogVariant::BluRay(v) => {
                sqlx::query(
                    "INSERT INTO blurays (entry_id, studio, duration_minutes) VALUES ($1, $2, $3)",
                )
                .bind(entry_id)
                .bind(&v.studio)
                .bind(v.duration_minutes)
                .execute(&mut *tx)
                .await?;
            }
            CatalogVariant::Device(d) => {
                sqlx::query("INSERT INTO devices (entry_id, brand, model) VALUES ($1, $2, $3)")
                    .bind(entry_id)
                    .bind(&d.brand)
                    .bind(&d.model)
                    .execute(&mut *tx)
                    .await?;
            }
            CatalogVariant::Unspecified => {}
        }

        for category_id in &entry.category_ids {
            sqlx::query(
                "INSERT INTO catalog_entry_categories (entry_id, category_id) VALUES ($1, $2)",
            )
            .bind(entry_id)
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_constraint_violation(e, "category tag"))?;
        }

        tx.commit().await?;

        self.get_by_id(entry_id).await
    }

    /// Delete an entry; copies cascade with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM catalog_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Catalog entry {} not found", id)));
        }
        Ok(())
    }
}

fn summary_from_row(row: &PgRow) -> CatalogSummary {
    CatalogSummary {
        id: row.get("id"),
        title: row.get("title"),
        author: row.get("author"),
        variant: variant_from_row(row),
        copies: CopyCounts {
            available: row.get("n_available"),
            excluded: row.get("n_excluded"),
            decommissioned: row.get("n_decommissioned"),
        },
    }
}
