//! Reconciliation report records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Doi;

/// A publication present in the reference graph but absent from the target.
///
/// Only title and identifier are known; no citation-level detail is
/// possible for a document the target has never seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDocument {
    pub doi: Doi,
    pub title: String,
}

/// A citation present under a document in the reference graph but absent
/// under the same document in the target graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCitation {
    /// Title of the cited publication
    pub cited_article: String,

    /// Target-provider landing link for the cited publication ("" when the
    /// target has no record of it)
    pub cited_link: String,

    /// Title of the citing work
    pub citing_article: String,

    /// Target-provider landing link for the citing work ("" when unknown)
    pub citing_link: String,
}

/// The durable output artifact of a reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// When the diff was computed
    pub generated_at: DateTime<Utc>,

    /// Provider id of the reference graph (gaps are reported relative to it)
    pub reference: String,

    /// Provider id of the target graph
    pub target: String,

    /// Documents the target is missing entirely, in reference order
    pub missing_documents: Vec<MissingDocument>,

    /// Citations the target is missing under documents it does have,
    /// in reference order
    pub missing_citations: Vec<MissingCitation>,
}

impl ReconciliationReport {
    /// True when the target graph covers everything the reference has.
    pub fn is_clean(&self) -> bool {
        self.missing_documents.is_empty() && self.missing_citations.is_empty()
    }
}
