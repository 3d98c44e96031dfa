//! End-to-end pipeline tests: build two citation graphs from scripted
//! providers, reconcile them, and check the report.

use citegap::graph::build_citation_graph;
use citegap::models::{CitationGraph, CitingWork, Doi, PublicationRecord};
use citegap::providers::mock::{MockLookup, MockProvider};
use citegap::reconcile::diff_graphs;
use citegap::resolver::{TitleCache, TitleResolver};
use std::sync::Arc;
use tempfile::TempDir;

fn doi(s: &str) -> Doi {
    Doi::new(s).unwrap()
}

fn native(title: &str, id: &str, count: u64) -> PublicationRecord {
    PublicationRecord::new(title, count).doi(doi(id))
}

fn citing(title: &str, id: &str) -> CitingWork {
    CitingWork::new(title).doi(doi(id))
}

fn resolver(lookup: MockLookup, dir: &TempDir) -> TitleResolver {
    TitleResolver::new(
        Arc::new(lookup),
        TitleCache::empty(&dir.path().join("cache.json")),
        0,
    )
}

async fn build(provider: &MockProvider, resolver: &mut TitleResolver) -> CitationGraph {
    build_citation_graph(provider, resolver, "author").await.unwrap()
}

#[tokio::test]
async fn test_full_run_reports_gaps_between_two_providers() {
    // The index knows two documents; one is absent from the database and
    // the other is missing a citation there.
    let index = MockProvider::new("scholar")
        .with_publication(
            native("Shared Paper", "10.1/shared", 2),
            vec![citing("Citer One", "10.1/c1"), citing("Citer Two", "10.1/c2")],
        )
        .with_publication(
            native("Index Only Paper", "10.1/only", 1),
            vec![citing("Citer Three", "10.1/c3")],
        );
    let database = MockProvider::new("scopus")
        .with_publication(
            native("Shared Paper", "10.1/shared", 1),
            vec![citing("Citer One", "10.1/c1")],
        )
        .with_link("10.1/shared", "https://db.example/shared")
        .with_link("10.1/c2", "https://db.example/c2");

    let dir = TempDir::new().unwrap();
    let mut res = resolver(MockLookup::new(), &dir);

    let reference = build(&index, &mut res).await;
    let target = build(&database, &mut res).await;
    let report = diff_graphs(&reference, "scholar", &target, &database)
        .await
        .unwrap();

    assert_eq!(report.missing_documents.len(), 1);
    assert_eq!(report.missing_documents[0].doi.as_str(), "10.1/only");

    assert_eq!(report.missing_citations.len(), 1);
    let gap = &report.missing_citations[0];
    assert_eq!(gap.cited_article, "Shared Paper");
    assert_eq!(gap.cited_link, "https://db.example/shared");
    assert_eq!(gap.citing_article, "Citer Two");
    assert_eq!(gap.citing_link, "https://db.example/c2");
}

#[tokio::test]
async fn test_unresolvable_titles_stay_out_of_the_diff() {
    // The index publication resolves; its second citing work does not, so
    // only the resolvable citation can ever be reported missing.
    let index = MockProvider::new("scholar").with_publication(
        PublicationRecord::new("A Paper", 2),
        vec![
            CitingWork::new("Known Citer"),
            CitingWork::new("Unknown Citer"),
        ],
    );
    let lookup = MockLookup::new()
        .with_match("A Paper", "A Paper", "10.1/a")
        .with_match("Known Citer", "Known Citer", "10.1/k");

    let dir = TempDir::new().unwrap();
    let mut res = resolver(lookup, &dir);

    let reference = build(&index, &mut res).await;
    let target = CitationGraph::new();
    let database = MockProvider::new("scopus");
    let report = diff_graphs(&reference, "scholar", &target, &database)
        .await
        .unwrap();

    assert_eq!(report.missing_documents.len(), 1);
    let doc = reference.get(&doi("10.1/a")).unwrap();
    assert_eq!(doc.citations.len(), 1);
}

#[tokio::test]
async fn test_citation_fetch_failure_leaves_other_documents_intact() {
    let index = MockProvider::new("scholar")
        .with_publication(native("First", "10.1/a", 1), vec![citing("CA", "10.1/ca")])
        .with_publication(native("Second", "10.1/b", 1), vec![citing("CB", "10.1/cb")])
        .with_publication(native("Third", "10.1/c", 1), vec![citing("CC", "10.1/cc")])
        .with_failing_citations("Second");

    let dir = TempDir::new().unwrap();
    let mut res = resolver(MockLookup::new(), &dir);
    let reference = build(&index, &mut res).await;

    let target = CitationGraph::new();
    let database = MockProvider::new("scopus");
    let report = diff_graphs(&reference, "scholar", &target, &database)
        .await
        .unwrap();

    // All three documents survived the partial failure and are reported.
    assert_eq!(report.missing_documents.len(), 3);
    assert_eq!(reference.get(&doi("10.1/a")).unwrap().citations.len(), 1);
    assert!(reference.get(&doi("10.1/b")).unwrap().citations.is_empty());
    assert_eq!(reference.get(&doi("10.1/c")).unwrap().citations.len(), 1);
}

#[tokio::test]
async fn test_diff_works_from_reloaded_snapshots() {
    let index = MockProvider::new("scholar").with_publication(
        native("Paper", "10.1/a", 1),
        vec![citing("Citer", "10.1/c")],
    );

    let dir = TempDir::new().unwrap();
    let mut res = resolver(MockLookup::new(), &dir);
    let graph = build(&index, &mut res).await;

    let snapshot = dir.path().join("scholar_documents.json");
    graph.save_snapshot(&snapshot).unwrap();
    let reference = CitationGraph::load_snapshot(&snapshot).unwrap();

    let database = MockProvider::new("scopus");
    let report = diff_graphs(&reference, "scholar", &CitationGraph::new(), &database)
        .await
        .unwrap();

    assert_eq!(report.missing_documents.len(), 1);
    assert_eq!(report.missing_documents[0].title, "Paper");
}

#[tokio::test]
async fn test_resolver_cache_is_shared_across_both_fetches() {
    // Both providers list the same unidentified publication; the second
    // fetch must be served from the cache.
    let index = MockProvider::new("scholar")
        .with_publication(PublicationRecord::new("Same Paper", 1), vec![]);
    let database = MockProvider::new("scopus")
        .with_publication(PublicationRecord::new("Same Paper", 1), vec![]);

    let lookup = Arc::new(MockLookup::new().with_match("Same Paper", "Same Paper", "10.1/same"));
    let dir = TempDir::new().unwrap();
    let mut res = TitleResolver::new(
        Arc::clone(&lookup) as Arc<dyn citegap::resolver::DoiLookup>,
        TitleCache::empty(&dir.path().join("cache.json")),
        0,
    );

    build(&index, &mut res).await;
    build(&database, &mut res).await;

    assert_eq!(lookup.call_count(), 1);
}
