//! Google Scholar source adapter, via the SerpApi JSON API.
//!
//! Scholar carries no DOIs, so every title coming out of this adapter is
//! resolved downstream. Citation listings are paginated at a fixed page
//! size; a publication can expose more than one cite group, and the sum of
//! the group totals is reconciled against the publication's declared
//! citation count.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{CitingWork, Doi, PublicationRecord};
use crate::providers::{BibliographicProvider, ProviderError};
use crate::utils::HttpClient;

const SERPAPI_BASE: &str = "https://serpapi.com";

/// One article row from the author profile.
#[derive(Debug, Clone)]
pub struct ScholarArticle {
    pub title: String,
    pub cited_by: u64,
    pub cite_ids: Vec<String>,
}

/// One page of a citation listing.
#[derive(Debug, Clone)]
pub struct CitationPage {
    /// Provider-declared total for the whole listing, not this page
    pub total_results: u64,
    pub titles: Vec<String>,
}

/// Raw transport for the Scholar JSON API.
///
/// The provider's pagination logic runs on top of this trait, so tests
/// drive it with a scripted fake instead of a network.
#[async_trait]
pub trait ScholarApi: Send + Sync {
    /// All articles on an author profile.
    async fn author_articles(&self, author_id: &str) -> Result<Vec<ScholarArticle>, ProviderError>;

    /// One page of works citing a cite group, starting at `start`.
    async fn citations_page(
        &self,
        cite_id: &str,
        start: u64,
        page_size: u64,
    ) -> Result<CitationPage, ProviderError>;
}

/// SerpApi-backed [`ScholarApi`].
#[derive(Debug, Clone)]
pub struct SerpApiClient {
    client: HttpClient,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new(),
            api_key: api_key.into(),
            base_url: SERPAPI_BASE.to_string(),
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
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Failed to reach SerpApi: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::Api(format!(
                "SerpApi returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse SerpApi JSON: {}", e)))
    }
}

#[async_trait]
impl ScholarApi for SerpApiClient {
    async fn author_articles(&self, author_id: &str) -> Result<Vec<ScholarArticle>, ProviderError> {
        let url = format!(
            "{}/search.json?engine=google_scholar_author&author_id={}&api_key={}",
            self.base_url,
            urlencoding::encode(author_id),
            urlencoding::encode(&self.api_key)
        );

        let data: AuthorResponse = self.fetch_json(&url).await?;

        let articles = data
            .articles
            .into_iter()
            .map(|a| {
                let cited_by = a.cited_by.as_ref().map(|c| c.value).unwrap_or(0);
                let cite_ids = a
                    .cited_by
                    .and_then(|c| c.cites_id)
                    .map(|ids| ids.split(',').map(str::to_string).collect())
                    .unwrap_or_default();
                ScholarArticle {
                    title: a.title,
                    cited_by,
                    cite_ids,
                }
            })
            .collect();

        Ok(articles)
    }

    async fn citations_page(
        &self,
        cite_id: &str,
        start: u64,
        page_size: u64,
    ) -> Result<CitationPage, ProviderError> {
        let url = format!(
            "{}/search.json?engine=google_scholar&cites={}&start={}&num={}&api_key={}",
            self.base_url,
            urlencoding::encode(cite_id),
            start,
            page_size,
            urlencoding::encode(&self.api_key)
        );

        let data: CitationsResponse = self.fetch_json(&url).await?;

        Ok(CitationPage {
            total_results: data
                .search_information
                .map(|i| i.total_results)
                .unwrap_or(0),
            titles: data.organic_results.into_iter().map(|r| r.title).collect(),
        })
    }
}

/// The academic search index adapter.
pub struct ScholarProvider {
    api: Arc<dyn ScholarApi>,
    page_size: u64,
}

impl ScholarProvider {
    pub fn new(api: Arc<dyn ScholarApi>, page_size: u64) -> Self {
        Self { api, page_size }
    }
}

#[async_trait]
impl BibliographicProvider for ScholarProvider {
    fn id(&self) -> &str {
        "scholar"
    }

    fn name(&self) -> &str {
        "Google Scholar"
    }

    async fn resolve_author(&self, identity: &str) -> Result<String, ProviderError> {
        // Scholar profiles are addressed directly by their public id.
        Ok(identity.to_string())
    }

    async fn list_publications(
        &self,
        author_key: &str,
    ) -> Result<Vec<PublicationRecord>, ProviderError> {
        let articles = self.api.author_articles(author_key).await?;
        tracing::info!("Scholar profile {} lists {} articles", author_key, articles.len());

        Ok(articles
            .into_iter()
            .map(|a| {
                let mut record = PublicationRecord::new(a.title, a.cited_by);
                record.citation_groups = a.cite_ids;
                record
            })
            .collect())
    }

    async fn list_citations(
        &self,
        publication: &PublicationRecord,
    ) -> Result<Vec<CitingWork>, ProviderError> {
        let mut works = Vec::new();
        let mut grand_total: u64 = 0;

        for cite_id in &publication.citation_groups {
            let first = self.api.citations_page(cite_id, 0, self.page_size).await?;
            let total = first.total_results;
            tracing::debug!("Cite group {} declares {} results", cite_id, total);
            if total == 0 {
                continue;
            }
            grand_total += total;
            works.extend(first.titles.into_iter().map(CitingWork::new));

            let pages = total.div_ceil(self.page_size.max(1));
            for page in 1..pages {
                let next = self
                    .api
                    .citations_page(cite_id, page * self.page_size, self.page_size)
                    .await?;
                works.extend(next.titles.into_iter().map(CitingWork::new));
            }
        }

        if grand_total != publication.citation_count {
            tracing::warn!(
                "Citation totals for '{}' disagree: listings declare {}, profile declares {}",
                publication.title,
                grand_total,
                publication.citation_count
            );
        }

        Ok(works)
    }

    async fn article_link(&self, _doi: &Doi) -> Result<Option<String>, ProviderError> {
        // Scholar has no DOI-addressed landing pages.
        Ok(None)
    }
}

// ===== SerpApi response types =====

#[derive(Debug, Deserialize)]
struct AuthorResponse {
    #[serde(default)]
    articles: Vec<AuthorArticle>,
}

#[derive(Debug, Deserialize)]
struct AuthorArticle {
    title: String,
    cited_by: Option<CitedBy>,
}

#[derive(Debug, Deserialize)]
struct CitedBy {
    #[serde(default)]
    value: u64,
    cites_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CitationsResponse {
    search_information: Option<SearchInformation>,
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct SearchInformation {
    #[serde(default)]
    total_results: u64,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: String,
}
