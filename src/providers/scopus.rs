//! Scopus source adapter, via the Elsevier Search API.
//!
//! Unlike the search index, Scopus records carry DOIs natively, so
//! publications and citations coming out of this adapter rarely need the
//! title resolver. Author identity is an ORCID, resolved once to a Scopus
//! author id. All listings go through the same search endpoint with
//! `start`/`count` pagination.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{CitingWork, Doi, PublicationRecord};
use crate::providers::{BibliographicProvider, ProviderError};
use crate::utils::HttpClient;

const ELSEVIER_API_BASE: &str = "https://api.elsevier.com";

/// One entry of a search page, already stripped of provider field names.
#[derive(Debug, Clone, Default)]
pub struct ScopusEntry {
    pub eid: Option<String>,
    pub doi: Option<String>,
    pub title: Option<String>,
    pub cited_by: u64,
    pub link: Option<String>,
}

/// One page of Scopus search results.
#[derive(Debug, Clone)]
pub struct ScopusPage {
    /// Provider-declared total for the whole result set
    pub total_results: u64,
    pub entries: Vec<ScopusEntry>,
}

/// Raw transport for the Scopus search API.
#[async_trait]
pub trait ScopusApi: Send + Sync {
    /// Scopus author id for an ORCID, or `None` when unknown.
    async fn author_by_orcid(&self, orcid: &str) -> Result<Option<String>, ProviderError>;

    /// One page of results for a Scopus search query.
    async fn search_page(
        &self,
        query: &str,
        start: u64,
        count: u64,
    ) -> Result<ScopusPage, ProviderError>;
}

/// Elsevier-API-backed [`ScopusApi`].
#[derive(Debug, Clone)]
pub struct ScopusClient {
    client: HttpClient,
    api_key: String,
    base_url: String,
}

impl ScopusClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new(),
            api_key: api_key.into(),
            base_url: ELSEVIER_API_BASE.to_string(),
        }
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new(api_key)
        }
    }

    async fn fetch_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url)
            .header("X-ELS-APIKey", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Failed to reach Scopus: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::Api(format!(
                "Scopus API returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse Scopus JSON: {}", e)))
    }
}

#[async_trait]
impl ScopusApi for ScopusClient {
    async fn author_by_orcid(&self, orcid: &str) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}/content/search/author?query={}",
            self.base_url,
            urlencoding::encode(&format!("ORCID({})", orcid))
        );

        let data: SearchResponse = self.fetch_json(&url).await?;

        let author_id = data
            .search_results
            .entry
            .into_iter()
            .filter(|e| e.error.is_none())
            .filter_map(|e| e.identifier)
            // The identifier comes back as "AUTHOR_ID:7004212771".
            .map(|id| id.trim_start_matches("AUTHOR_ID:").to_string())
            .next();

        Ok(author_id)
    }

    async fn search_page(
        &self,
        query: &str,
        start: u64,
        count: u64,
    ) -> Result<ScopusPage, ProviderError> {
        let url = format!(
            "{}/content/search/scopus?query={}&start={}&count={}",
            self.base_url,
            urlencoding::encode(query),
            start,
            count
        );

        let data: SearchResponse = self.fetch_json(&url).await?;
        let results = data.search_results;

        let total_results = results
            .total_results
            .as_deref()
            .unwrap_or("0")
            .parse::<u64>()
            .map_err(|e| ProviderError::Parse(format!("Bad totalResults: {}", e)))?;

        let entries = results
            .entry
            .into_iter()
            // An empty result set comes back as a single error entry.
            .filter(|e| e.error.is_none())
            .map(|e| ScopusEntry {
                eid: e.eid,
                doi: e.doi,
                title: e.title,
                cited_by: e
                    .cited_by_count
                    .as_deref()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(0),
                link: e
                    .link
                    .into_iter()
                    .find(|l| l.rel.as_deref() == Some("scopus"))
                    .and_then(|l| l.href),
            })
            .collect();

        Ok(ScopusPage {
            total_results,
            entries,
        })
    }
}

/// The citation database adapter.
pub struct ScopusProvider {
    api: Arc<dyn ScopusApi>,
    page_size: u64,
}

impl ScopusProvider {
    pub fn new(api: Arc<dyn ScopusApi>, page_size: u64) -> Self {
        Self { api, page_size }
    }

    /// Run one query to exhaustion, page by page.
    async fn search_all(&self, query: &str) -> Result<Vec<ScopusEntry>, ProviderError> {
        let first = self.api.search_page(query, 0, self.page_size).await?;
        let total = first.total_results;
        let mut entries = first.entries;

        let pages = total.div_ceil(self.page_size.max(1));
        for page in 1..pages {
            let next = self
                .api
                .search_page(query, page * self.page_size, self.page_size)
                .await?;
            entries.extend(next.entries);
        }

        if entries.len() as u64 != total {
            tracing::warn!(
                "Scopus query '{}' returned {} entries but declared {}",
                query,
                entries.len(),
                total
            );
        }

        Ok(entries)
    }
}

#[async_trait]
impl BibliographicProvider for ScopusProvider {
    fn id(&self) -> &str {
        "scopus"
    }

    fn name(&self) -> &str {
        "Scopus"
    }

    async fn resolve_author(&self, identity: &str) -> Result<String, ProviderError> {
        let author_id = self
            .api
            .author_by_orcid(identity)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("No Scopus author for ORCID {}", identity)))?;

        tracing::info!("Scopus author id for ORCID {}: {}", identity, author_id);
        Ok(author_id)
    }

    async fn list_publications(
        &self,
        author_key: &str,
    ) -> Result<Vec<PublicationRecord>, ProviderError> {
        let entries = self.search_all(&format!("AU-ID({})", author_key)).await?;
        tracing::info!("Scopus lists {} publications for author {}", entries.len(), author_key);

        Ok(entries
            .into_iter()
            .filter_map(|e| {
                let title = e.title?;
                let mut record = PublicationRecord::new(title, e.cited_by);
                record.doi = e.doi.and_then(Doi::new);
                record.citation_groups = e.eid.into_iter().collect();
                Some(record)
            })
            .collect())
    }

    async fn list_citations(
        &self,
        publication: &PublicationRecord,
    ) -> Result<Vec<CitingWork>, ProviderError> {
        let mut works = Vec::new();
        let mut grand_total: u64 = 0;

        for eid in &publication.citation_groups {
            let query = format!("REF({})", eid);
            let first = self.api.search_page(&query, 0, self.page_size).await?;
            let total = first.total_results;
            grand_total += total;

            let mut entries = first.entries;
            let pages = total.div_ceil(self.page_size.max(1));
            for page in 1..pages {
                let next = self
                    .api
                    .search_page(&query, page * self.page_size, self.page_size)
                    .await?;
                entries.extend(next.entries);
            }

            works.extend(entries.into_iter().filter_map(|e| {
                let title = e.title?;
                let mut work = CitingWork::new(title);
                work.doi = e.doi.and_then(Doi::new);
                Some(work)
            }));
        }

        if grand_total != publication.citation_count {
            tracing::warn!(
                "Citation totals for '{}' disagree: REF search declares {}, record declares {}",
                publication.title,
                grand_total,
                publication.citation_count
            );
        }

        Ok(works)
    }

    async fn article_link(&self, doi: &Doi) -> Result<Option<String>, ProviderError> {
        let page = self
            .api
            .search_page(&format!("DOI({})", doi.as_str()), 0, 1)
            .await?;

        Ok(page.entries.into_iter().find_map(|e| e.link))
    }
}

// ===== Elsevier API response types =====

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "search-results")]
    search_results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(rename = "opensearch:totalResults")]
    total_results: Option<String>,
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    error: Option<String>,
    eid: Option<String>,
    #[serde(rename = "dc:identifier")]
    identifier: Option<String>,
    #[serde(rename = "dc:title")]
    title: Option<String>,
    #[serde(rename = "prism:doi")]
    doi: Option<String>,
    #[serde(rename = "citedby-count")]
    cited_by_count: Option<String>,
    #[serde(default)]
    link: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@ref")]
    rel: Option<String>,
    #[serde(rename = "@href")]
    href: Option<String>,
}
