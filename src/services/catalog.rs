//! Catalog service: search, suggestions and entry management

use std::collections::HashSet;

use crate::{
    error::{AppResult, AppError},
    models::catalog::{
        CatalogEntry, CatalogQuery, CatalogSummary, CreateCatalogEntry, Suggestion,
    },
    repository::Repository,
};

use super::bibliographic::BibliographicService;

/// Suggestion lists are capped at this many lines
pub const SUGGESTION_LIMIT: usize = 10;
/// Below this many local hits the external lookup kicks in
pub const EXTERNAL_FALLBACK_THRESHOLD: usize = 5;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    bibliographic: BibliographicService,
}

impl CatalogService {
    pub fn new(repository: Repository, bibliographic: BibliographicService) -> Self {
        Self {
            repository,
            bibliographic,
        }
    }

    /// Search the catalog; empty query returns everything
    pub async fn search(&self, query: &CatalogQuery) -> AppResult<Vec<CatalogSummary>> {
        self.repository.catalog.search(query).await
    }

    /// Autocomplete suggestions. Local matches come first, deduplicated
    /// case-insensitively on (title, author); when fewer than
    /// [`EXTERNAL_FALLBACK_THRESHOLD`] local hits exist the external
    /// bibliographic lookup tops the list up to [`SUGGESTION_LIMIT`].
    pub async fn suggestions(&self, q: &str) -> AppResult<Vec<Suggestion>> {
        let q = q.trim();
        if q.is_empty() {
            return Ok(Vec::new());
        }

        let local = self
            .repository
            .catalog
            .suggest(q, SUGGESTION_LIMIT as i64)
            .await?;

        let mut seen = HashSet::new();
        let mut suggestions: Vec<Suggestion> = Vec::new();
        for summary in local {
            if !insert_dedup_key(&mut seen, &summary.title, summary.author.as_deref()) {
                continue;
            }
            suggestions.push(Suggestion {
                id: Some(summary.id),
                title: summary.title,
                author: summary.author,
                kind: summary.variant.kind().to_string(),
                external: false,
            });
        }

        if suggestions.len() < EXTERNAL_FALLBACK_THRESHOLD {
            let remote = self.bibliographic.search(q, SUGGESTION_LIMIT).await;
            for suggestion in remote {
                if suggestions.len() >= SUGGESTION_LIMIT {
                    break;
                }
                if insert_dedup_key(&mut seen, &suggestion.title, suggestion.author.as_deref()) {
                    suggestions.push(suggestion);
                }
            }
        }

        suggestions.truncate(SUGGESTION_LIMIT);
        Ok(suggestions)
    }

    pub async fn get_entry(&self, id: i32) -> AppResult<CatalogEntry> {
        self.repository.catalog.get_by_id(id).await
    }

    pub async fn create_entry(&self, entry: CreateCatalogEntry) -> AppResult<CatalogEntry> {
        if entry.title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
        self.repository.catalog.create(&entry).await
    }

    pub async fn delete_entry(&self, id: i32) -> AppResult<()> {
        self.repository.catalog.delete(id).await
    }
}

/// Insert the case-folded (title, author) key; false when already present
fn insert_dedup_key(seen: &mut HashSet<(String, String)>, title: &str, author: Option<&str>) -> bool {
    seen.insert((
        title.to_lowercase(),
        author.unwrap_or_default().to_lowercase(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_is_case_insensitive() {
        let mut seen = HashSet::new();
        assert!(insert_dedup_key(&mut seen, "El Quixot", Some("Cervantes")));
        assert!(!insert_dedup_key(&mut seen, "el quixot", Some("CERVANTES")));
        assert!(insert_dedup_key(&mut seen, "El Quixot", None));
    }
}
