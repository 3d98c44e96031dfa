//! Citation graph assembly.
//!
//! Drives one provider plus the title resolver into a [`CitationGraph`]:
//! every resolvable, cited publication by the author becomes a document,
//! with its citing works keyed by DOI. Unresolvable titles and uncited
//! publications are skipped and logged. A provider failure while listing
//! one publication's citations downgrades to a warning; the document stays
//! in the graph with the citations it has and the fetch moves on.

use crate::models::{CitationGraph, Document};
use crate::providers::{BibliographicProvider, ProviderError};
use crate::resolver::TitleResolver;

/// Fetch the author's complete citation graph from one provider.
///
/// Author resolution and publication listing failures abort the fetch and
/// propagate; everything below them degrades per item.
pub async fn build_citation_graph(
    provider: &dyn BibliographicProvider,
    resolver: &mut TitleResolver,
    identity: &str,
) -> Result<CitationGraph, ProviderError> {
    let author_key = provider.resolve_author(identity).await?;
    let publications = provider.list_publications(&author_key).await?;

    let mut graph = CitationGraph::new();

    for publication in &publications {
        let doi = match &publication.doi {
            Some(doi) => Some(doi.clone()),
            None => resolver.resolve(&publication.title).await,
        };
        let Some(doi) = doi else {
            tracing::info!("Publication not found: {}", publication.title);
            continue;
        };

        if publication.citation_count == 0 {
            tracing::info!(
                "Skipping publication {} because it has no citations",
                doi
            );
            continue;
        }

        tracing::info!(
            "{} '{}' ({} citations)",
            doi,
            publication.title,
            publication.citation_count
        );

        let mut document = Document::new(&publication.title);

        match provider.list_citations(publication).await {
            Ok(citing_works) => {
                for work in citing_works {
                    let citing_doi = match work.doi {
                        Some(doi) => Some(doi),
                        None => resolver.resolve(&work.title).await,
                    };
                    match citing_doi {
                        Some(citing_doi) => {
                            document.citations.insert(citing_doi, work.title);
                        }
                        None => tracing::info!("Citing work not found: {}", work.title),
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Citations for document {} may be incomplete: {}",
                    doi,
                    e
                );
            }
        }

        graph.insert(doi, document);
    }

    tracing::info!(
        "{}: {} documents, {} citations",
        provider.name(),
        graph.len(),
        graph.citation_count()
    );

    Ok(graph)
}
