use anyhow::{bail, Context, Result};
use citegap::config::{find_config_file, load_config, Config};
use citegap::graph::build_citation_graph;
use citegap::models::CitationGraph;
use citegap::providers::{
    BibliographicProvider, CrossRefLookup, ScholarProvider, ScopusClient, ScopusProvider,
    SerpApiClient,
};
use citegap::reconcile::{diff_graphs, write_report};
use citegap::resolver::{TitleCache, TitleResolver};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// citegap - Find citations recorded in one bibliographic source but missing from another
#[derive(Parser, Debug)]
#[command(name = "citegap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find citations recorded in one bibliographic source but missing from another", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available bibliographic providers
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Provider {
    #[value(name = "scholar")]
    Scholar,
    #[value(name = "scopus")]
    Scopus,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one provider's citation graph and save it as a snapshot
    Fetch {
        /// Provider to fetch from
        #[arg(long, short, value_enum)]
        provider: Provider,
    },

    /// Diff previously saved snapshots and write the report
    Diff,

    /// Fetch both providers, diff, and write the report
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("citegap={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from file if specified or found in default locations
    let config = if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Fetch { provider } => match provider {
            Provider::Scholar => {
                let provider = scholar_provider(&config)?;
                let graph = fetch_and_snapshot(
                    &provider,
                    &scholar_identity(&config)?,
                    &config,
                    &config.storage.scholar_snapshot,
                )
                .await?;
                println!(
                    "Fetched {} documents ({} citations) from {}",
                    graph.len(),
                    graph.citation_count(),
                    provider.name()
                );
            }
            Provider::Scopus => {
                let provider = scopus_provider(&config)?;
                let graph = fetch_and_snapshot(
                    &provider,
                    &scopus_identity(&config)?,
                    &config,
                    &config.storage.scopus_snapshot,
                )
                .await?;
                println!(
                    "Fetched {} documents ({} citations) from {}",
                    graph.len(),
                    graph.citation_count(),
                    provider.name()
                );
            }
        },

        Commands::Diff => {
            let reference = CitationGraph::load_snapshot(&config.storage.scholar_snapshot)
                .with_context(|| {
                    format!(
                        "No Scholar snapshot at {} (run `citegap fetch -p scholar` first)",
                        config.storage.scholar_snapshot.display()
                    )
                })?;
            let target = CitationGraph::load_snapshot(&config.storage.scopus_snapshot)
                .with_context(|| {
                    format!(
                        "No Scopus snapshot at {} (run `citegap fetch -p scopus` first)",
                        config.storage.scopus_snapshot.display()
                    )
                })?;

            let scopus = scopus_provider(&config)?;
            diff_and_report(&reference, &target, &scopus, &config).await?;
        }

        Commands::Run => {
            let scholar = scholar_provider(&config)?;
            let scopus = scopus_provider(&config)?;

            let reference = fetch_and_snapshot(
                &scholar,
                &scholar_identity(&config)?,
                &config,
                &config.storage.scholar_snapshot,
            )
            .await?;
            let target = fetch_and_snapshot(
                &scopus,
                &scopus_identity(&config)?,
                &config,
                &config.storage.scopus_snapshot,
            )
            .await?;

            diff_and_report(&reference, &target, &scopus, &config).await?;
        }
    }

    Ok(())
}

fn scholar_identity(config: &Config) -> Result<String> {
    if config.author.scholar_id.is_empty() {
        bail!("No Scholar profile id configured (set author.scholar_id)");
    }
    Ok(config.author.scholar_id.clone())
}

fn scopus_identity(config: &Config) -> Result<String> {
    if config.author.orcid.is_empty() {
        bail!("No ORCID configured (set author.orcid)");
    }
    Ok(config.author.orcid.clone())
}

fn scholar_provider(config: &Config) -> Result<ScholarProvider> {
    let api_key = config
        .api_keys
        .serpapi
        .clone()
        .context("No SerpApi key configured (set api_keys.serpapi or SERPAPI_API_KEY)")?;
    Ok(ScholarProvider::new(
        Arc::new(SerpApiClient::new(api_key)),
        config.fetch.page_size,
    ))
}

fn scopus_provider(config: &Config) -> Result<ScopusProvider> {
    let api_key = config
        .api_keys
        .elsevier
        .clone()
        .context("No Elsevier key configured (set api_keys.elsevier or ELSEVIER_API_KEY)")?;
    Ok(ScopusProvider::new(
        Arc::new(ScopusClient::new(api_key)),
        config.fetch.page_size,
    ))
}

/// Fetch one provider's graph, snapshot it, and flush the title cache.
async fn fetch_and_snapshot(
    provider: &dyn BibliographicProvider,
    identity: &str,
    config: &Config,
    snapshot_path: &std::path::Path,
) -> Result<CitationGraph> {
    let cache = TitleCache::load(&config.storage.cache_path).with_context(|| {
        format!(
            "Failed to load title cache from {}",
            config.storage.cache_path.display()
        )
    })?;
    let mut resolver = TitleResolver::new(
        Arc::new(CrossRefLookup::new()),
        cache,
        config.fetch.cache_flush_every,
    );

    let graph = build_citation_graph(provider, &mut resolver, identity)
        .await
        .with_context(|| format!("Fetch from {} failed", provider.name()))?;

    resolver.persist().context("Failed to save title cache")?;
    graph
        .save_snapshot(snapshot_path)
        .with_context(|| format!("Failed to save snapshot to {}", snapshot_path.display()))?;

    Ok(graph)
}

async fn diff_and_report(
    reference: &CitationGraph,
    target: &CitationGraph,
    target_provider: &ScopusProvider,
    config: &Config,
) -> Result<()> {
    let report = diff_graphs(reference, "scholar", target, target_provider)
        .await
        .context("Reconciliation failed")?;

    write_report(&report, &config.storage.report_path).with_context(|| {
        format!(
            "Failed to write report to {}",
            config.storage.report_path.display()
        )
    })?;

    if report.is_clean() {
        println!("No gaps: every reference document and citation is present in the target.");
    } else {
        println!(
            "{} documents and {} citations missing from {}; report written to {}",
            report.missing_documents.len(),
            report.missing_citations.len(),
            target_provider.name(),
            config.storage.report_path.display()
        );
    }

    Ok(())
}
