//! Title → DOI resolution with a durable cache.
//!
//! The resolver guarantees at most one external lookup per distinct title
//! per run, and — because the cache is persisted — across runs. A lookup
//! result is only accepted when the returned canonical title equals the
//! query title after normalization; this guards against the lookup service
//! returning a best-effort but wrong match for short or ambiguous titles.

mod cache;

pub use cache::TitleCache;

use async_trait::async_trait;
use std::io;
use std::sync::Arc;

use crate::models::Doi;
use crate::providers::ProviderError;

/// Best-match record returned by an identifier lookup service.
#[derive(Debug, Clone)]
pub struct LookupMatch {
    /// Canonical title of the matched publication
    pub title: String,

    /// Its identifier
    pub doi: Doi,
}

/// Zero-or-one best-match lookup against an identifier service.
#[async_trait]
pub trait DoiLookup: Send + Sync {
    async fn best_match(&self, title: &str) -> Result<Option<LookupMatch>, ProviderError>;
}

/// Case-fold and collapse whitespace for title comparison.
///
/// Punctuation is deliberately left alone: titles differing in punctuation
/// are treated as different publications.
pub fn normalize_title(title: &str) -> String {
    let folded = title.to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The title → DOI lookup-and-cache component.
pub struct TitleResolver {
    lookup: Arc<dyn DoiLookup>,
    cache: TitleCache,
    flush_every: usize,
    dirty: usize,
}

impl TitleResolver {
    /// `flush_every` bounds data loss on crash: the cache is saved after
    /// that many new resolutions (0 disables incremental saves).
    pub fn new(lookup: Arc<dyn DoiLookup>, cache: TitleCache, flush_every: usize) -> Self {
        Self {
            lookup,
            cache,
            flush_every,
            dirty: 0,
        }
    }

    /// Resolve a title to its DOI.
    ///
    /// `None` means "no identifier" — either the lookup found nothing, the
    /// match was rejected by the title guard, or the lookup call failed
    /// (logged, not raised). Every outcome is cached before returning.
    pub async fn resolve(&mut self, title: &str) -> Option<Doi> {
        if let Some(cached) = self.cache.get(title) {
            return Doi::new(cached);
        }

        let resolved = match self.lookup.best_match(title).await {
            Ok(Some(found)) => {
                if normalize_title(&found.title) == normalize_title(title) {
                    Some(found.doi)
                } else {
                    tracing::info!(
                        "Rejecting best match for '{}': canonical title is '{}'",
                        title,
                        found.title
                    );
                    None
                }
            }
            Ok(None) => {
                tracing::info!("Title '{}' not found by identifier lookup", title);
                None
            }
            Err(e) => {
                tracing::warn!("Identifier lookup failed for '{}': {}", title, e);
                None
            }
        };

        self.record(title, resolved)
    }

    fn record(&mut self, title: &str, resolved: Option<Doi>) -> Option<Doi> {
        let value = resolved
            .as_ref()
            .map(|d| d.as_str().to_string())
            .unwrap_or_default();
        self.cache.insert(title.to_string(), value);

        self.dirty += 1;
        if self.flush_every > 0 && self.dirty >= self.flush_every {
            if let Err(e) = self.cache.save() {
                tracing::warn!("Failed to flush title cache: {}", e);
            }
            self.dirty = 0;
        }

        resolved
    }

    /// Final cache flush, called at end of run.
    pub fn persist(&mut self) -> io::Result<()> {
        self.dirty = 0;
        self.cache.save()
    }

    pub fn cache(&self) -> &TitleCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockLookup;
    use tempfile::TempDir;

    fn resolver_with(lookup: Arc<MockLookup>, dir: &TempDir) -> TitleResolver {
        let cache = TitleCache::empty(&dir.path().join("cache.json"));
        TitleResolver::new(lookup, cache, 0)
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache() {
        let dir = TempDir::new().unwrap();
        let lookup = Arc::new(MockLookup::new().with_match("Foo Bar", "Foo Bar", "10.1/foo"));
        let mut resolver = resolver_with(Arc::clone(&lookup), &dir);

        let first = resolver.resolve("Foo Bar").await;
        let second = resolver.resolve("Foo Bar").await;

        assert_eq!(first.unwrap().as_str(), "10.1/foo");
        assert_eq!(second.unwrap().as_str(), "10.1/foo");
        assert_eq!(lookup.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unresolved_outcome_is_cached_too() {
        let dir = TempDir::new().unwrap();
        let lookup = Arc::new(MockLookup::new());
        let mut resolver = resolver_with(Arc::clone(&lookup), &dir);

        assert!(resolver.resolve("Unknown Title").await.is_none());
        assert!(resolver.resolve("Unknown Title").await.is_none());
        assert_eq!(lookup.call_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_unresolved_not_fatal() {
        let dir = TempDir::new().unwrap();
        let lookup = Arc::new(MockLookup::new().failing());
        let mut resolver = resolver_with(Arc::clone(&lookup), &dir);

        assert!(resolver.resolve("Any Title").await.is_none());
        // The failure is cached; no second call goes out.
        assert!(resolver.resolve("Any Title").await.is_none());
        assert_eq!(lookup.call_count(), 1);
    }

    #[tokio::test]
    async fn test_title_guard_rejects_different_title() {
        let dir = TempDir::new().unwrap();
        // Lookup returns "Foo Bar" as the best match for a longer query.
        let lookup = Arc::new(MockLookup::new().with_match("foo bar xyz", "Foo Bar", "10.1/foo"));
        let mut resolver = resolver_with(lookup, &dir);

        assert!(resolver.resolve("foo bar xyz").await.is_none());
    }

    #[tokio::test]
    async fn test_title_guard_accepts_case_difference() {
        let dir = TempDir::new().unwrap();
        let lookup = Arc::new(MockLookup::new().with_match("foo bar", "Foo Bar", "10.1/foo"));
        let mut resolver = resolver_with(lookup, &dir);

        let doi = resolver.resolve("foo bar").await;
        assert_eq!(doi.unwrap().as_str(), "10.1/foo");
    }

    #[tokio::test]
    async fn test_cached_entries_survive_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let lookup = Arc::new(MockLookup::new().with_match("Foo Bar", "Foo Bar", "10.1/foo"));
        let mut resolver =
            TitleResolver::new(lookup.clone(), TitleCache::empty(&path), 0);
        resolver.resolve("Foo Bar").await;
        resolver.persist().unwrap();

        // A fresh resolver over the reloaded cache never calls the lookup.
        let mut resolver =
            TitleResolver::new(lookup.clone(), TitleCache::load(&path).unwrap(), 0);
        let doi = resolver.resolve("Foo Bar").await;
        assert_eq!(doi.unwrap().as_str(), "10.1/foo");
        assert_eq!(lookup.call_count(), 1);
    }

    #[test]
    fn test_normalize_title_collapses_whitespace() {
        assert_eq!(normalize_title("  Foo   Bar\tBaz "), "foo bar baz");
        assert_eq!(normalize_title("FOO BAR"), normalize_title("foo bar"));
        // Punctuation is preserved.
        assert_ne!(normalize_title("foo bar."), normalize_title("foo bar"));
    }
}
