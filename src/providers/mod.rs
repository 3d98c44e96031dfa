//! Bibliographic providers behind a small capability interface.
//!
//! This module defines the [`BibliographicProvider`] trait that both source
//! adapters implement. The adapter logic downstream (graph builder,
//! reconciler) only ever talks to this trait, so it can be exercised with
//! the scripted fakes in [`mock`].
//!
//! Each adapter additionally hides its raw HTTP surface behind its own
//! transport trait (`ScholarApi`, `ScopusApi`), which is where pagination
//! gets tested without a network.

mod crossref;
mod scholar;
mod scopus;

pub mod mock;

pub use crossref::CrossRefLookup;
pub use scholar::{CitationPage, ScholarApi, ScholarArticle, ScholarProvider, SerpApiClient};
pub use scopus::{ScopusApi, ScopusClient, ScopusEntry, ScopusPage, ScopusProvider};

use async_trait::async_trait;

use crate::models::{CitingWork, Doi, PublicationRecord};

/// Capability interface over one bibliographic source.
///
/// All methods are blocking calls from the caller's point of view; nothing
/// here is retried or parallelized. Failures in `resolve_author` and
/// `list_publications` abort a fetch, while the graph builder treats a
/// `list_citations` failure as a per-publication warning.
#[async_trait]
pub trait BibliographicProvider: Send + Sync {
    /// Unique identifier for this provider (e.g. "scholar", "scopus")
    fn id(&self) -> &str;

    /// Human-readable name of this provider
    fn name(&self) -> &str;

    /// Resolve a public author identity (ORCID, profile id) to the
    /// provider's internal author key.
    async fn resolve_author(&self, identity: &str) -> Result<String, ProviderError>;

    /// Enumerate every publication by the author, following pagination
    /// until the provider-declared total is exhausted.
    async fn list_publications(
        &self,
        author_key: &str,
    ) -> Result<Vec<PublicationRecord>, ProviderError>;

    /// Enumerate the works citing one publication, across all of its
    /// citation groups.
    async fn list_citations(
        &self,
        publication: &PublicationRecord,
    ) -> Result<Vec<CitingWork>, ProviderError>;

    /// Landing link for a publication in this provider, for report output.
    /// A publication the provider has no record of yields `Ok(None)`.
    async fn article_link(&self, doi: &Doi) -> Result<Option<String>, ProviderError>;
}

/// Errors that can occur when talking to a provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (malformed JSON, missing field)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters (bad identity, missing credentials)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Author or publication not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// API-level error from the provider (non-2xx, auth failure)
    #[error("API error: {0}")]
    Api(String),

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(format!("JSON: {}", err))
    }
}
