//! Scripted fakes for testing the resolver, graph builder and reconciler.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::models::{CitingWork, Doi, PublicationRecord};
use crate::providers::{BibliographicProvider, ProviderError};
use crate::resolver::{DoiLookup, LookupMatch};

/// A [`DoiLookup`] returning scripted matches and counting calls.
#[derive(Debug, Default)]
pub struct MockLookup {
    matches: HashMap<String, (String, String)>,
    fail: bool,
    calls: Mutex<u64>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the best match for a query title.
    pub fn with_match(mut self, query: &str, canonical: &str, doi: &str) -> Self {
        self.matches
            .insert(query.to_string(), (canonical.to_string(), doi.to_string()));
        self
    }

    /// Make every lookup fail with a network error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Number of lookups issued so far.
    pub fn call_count(&self) -> u64 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl DoiLookup for MockLookup {
    async fn best_match(&self, title: &str) -> Result<Option<LookupMatch>, ProviderError> {
        *self.calls.lock().unwrap() += 1;

        if self.fail {
            return Err(ProviderError::Network("mock lookup down".to_string()));
        }

        Ok(self.matches.get(title).map(|(canonical, doi)| LookupMatch {
            title: canonical.clone(),
            doi: Doi::new(doi).expect("mock configured with empty DOI"),
        }))
    }
}

/// A [`BibliographicProvider`] serving scripted publications and citations.
///
/// Citations are keyed by publication title; a title registered as failing
/// makes that publication's citation listing error out, which is how the
/// partial-failure path gets exercised.
#[derive(Debug, Default)]
pub struct MockProvider {
    id: String,
    publications: Vec<PublicationRecord>,
    citations: HashMap<String, Vec<CitingWork>>,
    failing_citations: HashSet<String>,
    links: HashMap<String, String>,
}

impl MockProvider {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    /// Script one publication and the works citing it.
    pub fn with_publication(
        mut self,
        publication: PublicationRecord,
        citations: Vec<CitingWork>,
    ) -> Self {
        self.citations
            .insert(publication.title.clone(), citations);
        self.publications.push(publication);
        self
    }

    /// Make `list_citations` fail for the publication with this title.
    pub fn with_failing_citations(mut self, title: &str) -> Self {
        self.failing_citations.insert(title.to_string());
        self
    }

    /// Script the landing link for a DOI.
    pub fn with_link(mut self, doi: &str, link: &str) -> Self {
        self.links.insert(doi.to_string(), link.to_string());
        self
    }
}

#[async_trait]
impl BibliographicProvider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Provider"
    }

    async fn resolve_author(&self, identity: &str) -> Result<String, ProviderError> {
        Ok(identity.to_string())
    }

    async fn list_publications(
        &self,
        _author_key: &str,
    ) -> Result<Vec<PublicationRecord>, ProviderError> {
        Ok(self.publications.clone())
    }

    async fn list_citations(
        &self,
        publication: &PublicationRecord,
    ) -> Result<Vec<CitingWork>, ProviderError> {
        if self.failing_citations.contains(&publication.title) {
            return Err(ProviderError::Network(format!(
                "mock citation listing down for '{}'",
                publication.title
            )));
        }

        Ok(self
            .citations
            .get(&publication.title)
            .cloned()
            .unwrap_or_default())
    }

    async fn article_link(&self, doi: &Doi) -> Result<Option<String>, ProviderError> {
        Ok(self.links.get(doi.as_str()).cloned())
    }
}
