//! Configuration management.
//!
//! All run parameters — author identity, credentials, page size, file
//! locations — live here rather than as literals in the pipeline. Values
//! come from a TOML file plus `CITEGAP_`-prefixed environment overrides.
//!
//! ```toml
//! [author]
//! orcid = "0000-0003-2675-0000"
//! scholar_id = "_yTpZ7QAAAAJ"
//!
//! [api_keys]
//! serpapi = "your-serpapi-key"
//! elsevier = "your-elsevier-key"
//!
//! [fetch]
//! page_size = 20
//! cache_flush_every = 25
//!
//! [storage]
//! cache_path = "doi_cache.json"
//! scholar_snapshot = "scholar_documents.json"
//! scopus_snapshot = "scopus_documents.json"
//! report_path = "missing_citations.yaml"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Author identities at each provider
    #[serde(default)]
    pub author: AuthorConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Fetch behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Cache, snapshot and report locations
    #[serde(default)]
    pub storage: StorageConfig,
}

/// The author whose record is being reconciled
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorConfig {
    /// ORCID, used to resolve the Scopus author id
    #[serde(default)]
    pub orcid: String,

    /// Google Scholar profile id
    #[serde(default)]
    pub scholar_id: String,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// SerpApi key for the Scholar adapter
    #[serde(default)]
    pub serpapi: Option<String>,

    /// Elsevier key for the Scopus adapter
    #[serde(default)]
    pub elsevier: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            serpapi: std::env::var("SERPAPI_API_KEY").ok(),
            elsevier: std::env::var("ELSEVIER_API_KEY").ok(),
        }
    }
}

/// Fetch behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Page size for paginated provider listings
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Flush the title cache after this many new resolutions (0 = only at
    /// end of run)
    #[serde(default = "default_cache_flush_every")]
    pub cache_flush_every: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            cache_flush_every: default_cache_flush_every(),
        }
    }
}

fn default_page_size() -> u64 {
    20
}

fn default_cache_flush_every() -> usize {
    25
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Durable title → DOI cache
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Scholar citation-graph snapshot
    #[serde(default = "default_scholar_snapshot")]
    pub scholar_snapshot: PathBuf,

    /// Scopus citation-graph snapshot
    #[serde(default = "default_scopus_snapshot")]
    pub scopus_snapshot: PathBuf,

    /// Reconciliation report
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            scholar_snapshot: default_scholar_snapshot(),
            scopus_snapshot: default_scopus_snapshot(),
            report_path: default_report_path(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("doi_cache.json")
}

fn default_scholar_snapshot() -> PathBuf {
    PathBuf::from("scholar_documents.json")
}

fn default_scopus_snapshot() -> PathBuf {
    PathBuf::from("scopus_documents.json")
}

fn default_report_path() -> PathBuf {
    PathBuf::from("missing_citations.yaml")
}

/// Load configuration from a file plus environment overrides
pub fn load_config(path: &PathBuf) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.as_path()))
        .add_source(config::Environment::with_prefix("CITEGAP").separator("__"))
        .build()?;

    settings.try_deserialize()
}

/// Look for a config file in the default locations
pub fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        Some(PathBuf::from("citegap.toml")),
        dirs::config_dir().map(|d| d.join("citegap").join("config.toml")),
    ];

    candidates.into_iter().flatten().find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fetch.page_size, 20);
        assert_eq!(config.fetch.cache_flush_every, 25);
        assert_eq!(config.storage.cache_path, PathBuf::from("doi_cache.json"));
    }

    #[test]
    fn test_config_parses_from_toml() {
        let raw = r#"
            [author]
            orcid = "0000-0003-2675-0000"
            scholar_id = "abc"

            [fetch]
            page_size = 10
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.author.orcid, "0000-0003-2675-0000");
        assert_eq!(config.fetch.page_size, 10);
        // Unset sections fall back to defaults.
        assert_eq!(config.fetch.cache_flush_every, 25);
        assert_eq!(
            config.storage.report_path,
            PathBuf::from("missing_citations.yaml")
        );
    }
}
