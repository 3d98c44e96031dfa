//! Citation-graph reconciliation.
//!
//! Walks a reference graph in insertion order and reports everything the
//! target graph lacks: whole documents the target has never seen, and
//! citations missing under documents both sides share. Landing links for
//! the report are looked up against the target provider.

use chrono::Utc;
use std::fs;
use std::io;
use std::path::Path;

use crate::models::{
    CitationGraph, MissingCitation, MissingDocument, ReconciliationReport,
};
use crate::providers::{BibliographicProvider, ProviderError};

/// Compare two citation graphs and collect what `target` is missing.
///
/// `reference_id` names the reference graph's provider in the report;
/// `target_links` is also the source of report landing links (a DOI the
/// target cannot link is recorded with an empty link, not dropped).
pub async fn diff_graphs(
    reference: &CitationGraph,
    reference_id: &str,
    target: &CitationGraph,
    target_links: &dyn BibliographicProvider,
) -> Result<ReconciliationReport, ProviderError> {
    let mut missing_documents = Vec::new();
    let mut missing_citations = Vec::new();

    for (doi, document) in reference.iter() {
        let Some(target_document) = target.get(doi) else {
            tracing::info!(
                "Document {} ('{}') not present in {}",
                doi,
                document.title,
                target_links.name()
            );
            missing_documents.push(MissingDocument {
                doi: doi.clone(),
                title: document.title.clone(),
            });
            continue;
        };

        for (citing_doi, citing_title) in &document.citations {
            if target_document.citations.contains_key(citing_doi) {
                continue;
            }

            tracing::info!(
                "Citation {} for article {} not present in {}",
                citing_doi,
                doi,
                target_links.name()
            );

            let cited_link = target_links.article_link(doi).await?.unwrap_or_default();
            let citing_link = target_links
                .article_link(citing_doi)
                .await?
                .unwrap_or_default();

            missing_citations.push(MissingCitation {
                cited_article: document.title.clone(),
                cited_link,
                citing_article: citing_title.clone(),
                citing_link,
            });
        }
    }

    Ok(ReconciliationReport {
        generated_at: Utc::now(),
        reference: reference_id.to_string(),
        target: target_links.id().to_string(),
        missing_documents,
        missing_citations,
    })
}

/// Serialize the report to a YAML file for human review.
pub fn write_report(report: &ReconciliationReport, path: &Path) -> io::Result<()> {
    let yaml = serde_yaml::to_string(report)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    fs::write(path, yaml)?;

    tracing::info!(
        "Wrote report to {} ({} missing documents, {} missing citations)",
        path.display(),
        report.missing_documents.len(),
        report.missing_citations.len()
    );
    Ok(())
}
