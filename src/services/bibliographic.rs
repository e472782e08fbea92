//! External bibliographic lookup used as a suggestion fallback.
//!
//! Best effort only: timeouts, non-200 responses and parse failures all
//! degrade to an empty result and are never surfaced to the caller.

use serde::Deserialize;
use std::time::Duration;

use crate::{config::BibliographicConfig, models::catalog::Suggestion};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
}

#[derive(Clone)]
pub struct BibliographicService {
    client: reqwest::Client,
    base_url: String,
}

impl BibliographicService {
    pub fn new(config: &BibliographicConfig) -> Self {
        let timeout = if config.timeout_secs == 0 { 5 } else { config.timeout_secs };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .unwrap_or_default();
        let base_url = if config.base_url.is_empty() {
            "https://openlibrary.org".to_string()
        } else {
            config.base_url.trim_end_matches('/').to_string()
        };
        Self { client, base_url }
    }

    /// Title search against the external API. Always returns a (possibly
    /// empty) list.
    pub async fn search(&self, q: &str, limit: usize) -> Vec<Suggestion> {
        let url = format!("{}/search.json", self.base_url);

        let response = match self
            .client
            .get(&url)
            .query(&[("q", q), ("limit", &limit.to_string())])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Bibliographic lookup failed: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Bibliographic lookup returned {}", response.status());
            return Vec::new();
        }

        let parsed: SearchResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!("Bibliographic response not parseable: {}", e);
                return Vec::new();
            }
        };

        parsed
            .docs
            .into_iter()
            .filter_map(|doc| {
                let title = doc.title?;
                Some(Suggestion {
                    id: None,
                    title,
                    author: doc.author_name.into_iter().next(),
                    kind: "book".to_string(),
                    external: true,
                })
            })
            .take(limit)
            .collect()
    }
}
