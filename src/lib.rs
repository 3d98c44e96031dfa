//! # citegap
//!
//! Cross-references an author's publication record between two
//! bibliographic sources — an academic search index and a citation
//! database — and reports citations recorded in one but missing from the
//! other.
//!
//! ## Architecture
//!
//! - [`models`]: Core data structures (Doi, Document, CitationGraph,
//!   report records)
//! - [`providers`]: Source adapters behind the
//!   [`BibliographicProvider`](providers::BibliographicProvider) trait
//! - [`resolver`]: Title → DOI resolution with a durable cache
//! - [`graph`]: Citation graph assembly and snapshots
//! - [`reconcile`]: Graph diffing and report output
//! - [`config`]: Configuration management
//! - [`utils`]: HTTP client

pub mod config;
pub mod graph;
pub mod models;
pub mod providers;
pub mod reconcile;
pub mod resolver;
pub mod utils;

// Re-export commonly used types
pub use models::{CitationGraph, Doi};
pub use providers::BibliographicProvider;
pub use resolver::TitleResolver;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
