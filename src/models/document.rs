//! Core citation-graph types: DOI identifiers, documents and the graph.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Canonical identifier for a publication, stable across sources.
///
/// The inner string is guaranteed non-empty: "no identifier" is expressed
/// as `Option<Doi>::None`, never as an empty `Doi`. This keeps empty keys
/// out of every citation map by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Doi(String);

impl Doi {
    /// Parse a DOI from provider output.
    ///
    /// Strips the common `https://doi.org/` and `doi:` prefixes and
    /// surrounding whitespace. Returns `None` when nothing remains.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let clean = raw
            .as_ref()
            .trim()
            .trim_start_matches("https://doi.org/")
            .trim_start_matches("http://doi.org/")
            .trim_start_matches("doi:")
            .trim();

        if clean.is_empty() {
            None
        } else {
            Some(Self(clean.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Doi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Doi {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Doi::new(&raw).ok_or_else(|| serde::de::Error::custom("empty DOI"))
    }
}

/// One publication together with the works that cite it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Title as reported by the source that produced this document
    pub title: String,

    /// Citing works, keyed by their DOI. A DOI cited more than once
    /// collapses to a single entry; the last title written wins.
    pub citations: IndexMap<Doi, String>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            citations: IndexMap::new(),
        }
    }
}

/// In-memory mapping from DOI to [`Document`], in insertion order.
///
/// Built fresh per run by the graph builder and never mutated afterward.
/// Iteration order is the order publications were inserted, which is the
/// order the source enumerated them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationGraph {
    documents: IndexMap<Doi, Document>,
}

impl CitationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doi: Doi, document: Document) {
        self.documents.insert(doi, document);
    }

    pub fn get(&self, doi: &Doi) -> Option<&Document> {
        self.documents.get(doi)
    }

    pub fn contains(&self, doi: &Doi) -> bool {
        self.documents.contains_key(doi)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Doi, &Document)> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total number of citation entries across all documents.
    pub fn citation_count(&self) -> usize {
        self.documents.values().map(|d| d.citations.len()).sum()
    }

    /// Write the graph to a JSON snapshot, replacing the file atomically.
    pub fn save_snapshot(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let tmp = match dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
            None => tempfile::NamedTempFile::new_in(".")?,
        };
        fs::write(tmp.path(), json)?;
        tmp.persist(path).map_err(|e| e.error)?;

        tracing::debug!("Saved snapshot with {} documents to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a graph from a JSON snapshot written by [`save_snapshot`](Self::save_snapshot).
    pub fn load_snapshot(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doi_rejects_empty() {
        assert!(Doi::new("").is_none());
        assert!(Doi::new("   ").is_none());
        assert!(Doi::new("doi:").is_none());
    }

    #[test]
    fn test_doi_strips_prefixes() {
        let doi = Doi::new("https://doi.org/10.1234/abc").unwrap();
        assert_eq!(doi.as_str(), "10.1234/abc");

        let doi = Doi::new("doi:10.1234/abc ").unwrap();
        assert_eq!(doi.as_str(), "10.1234/abc");
    }

    #[test]
    fn test_citation_last_write_wins() {
        let mut doc = Document::new("A");
        let citing = Doi::new("10.1/c").unwrap();
        doc.citations.insert(citing.clone(), "old title".to_string());
        doc.citations.insert(citing.clone(), "new title".to_string());

        assert_eq!(doc.citations.len(), 1);
        assert_eq!(doc.citations[&citing], "new title");
    }

    #[test]
    fn test_graph_preserves_insertion_order() {
        let mut graph = CitationGraph::new();
        graph.insert(Doi::new("10.1/z").unwrap(), Document::new("Z"));
        graph.insert(Doi::new("10.1/a").unwrap(), Document::new("A"));
        graph.insert(Doi::new("10.1/m").unwrap(), Document::new("M"));

        let keys: Vec<&str> = graph.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(keys, vec!["10.1/z", "10.1/a", "10.1/m"]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let mut graph = CitationGraph::new();
        let mut doc = Document::new("A");
        doc.citations
            .insert(Doi::new("10.1/c").unwrap(), "C".to_string());
        graph.insert(Doi::new("10.1/a").unwrap(), doc);

        graph.save_snapshot(&path).unwrap();
        let reloaded = CitationGraph::load_snapshot(&path).unwrap();

        assert_eq!(reloaded.len(), 1);
        let doc = reloaded.get(&Doi::new("10.1/a").unwrap()).unwrap();
        assert_eq!(doc.title, "A");
        assert_eq!(doc.citations.len(), 1);
    }
}
