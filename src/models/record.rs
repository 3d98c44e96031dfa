//! Normalized adapter output records.
//!
//! Both providers reduce their native publication and citation payloads to
//! these two shapes; everything downstream (graph builder, resolver) is
//! provider-agnostic.

use serde::{Deserialize, Serialize};

use super::Doi;

/// One publication by the author, as enumerated by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// Title as reported by the provider
    pub title: String,

    /// Provider-declared number of citing works
    pub citation_count: u64,

    /// DOI when the provider carries one natively (the citation database
    /// does; the search index does not, and the resolver fills the gap)
    pub doi: Option<Doi>,

    /// Opaque provider keys for enumerating this publication's citing
    /// works. A publication can have more than one group; each group is
    /// paginated independently.
    pub citation_groups: Vec<String>,
}

impl PublicationRecord {
    pub fn new(title: impl Into<String>, citation_count: u64) -> Self {
        Self {
            title: title.into(),
            citation_count,
            doi: None,
            citation_groups: Vec::new(),
        }
    }

    pub fn doi(mut self, doi: Doi) -> Self {
        self.doi = Some(doi);
        self
    }
}

/// One work citing a publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitingWork {
    /// Title as reported by the provider
    pub title: String,

    /// DOI when the provider carries one natively
    pub doi: Option<Doi>,
}

impl CitingWork {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            doi: None,
        }
    }

    pub fn doi(mut self, doi: Doi) -> Self {
        self.doi = Some(doi);
        self
    }
}
