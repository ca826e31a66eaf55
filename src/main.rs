use clap::{Parser, Subcommand};
use std::fs;
use std::sync::Arc;
use tracing::{error, info, warn};

use cea_aggregator::collectors::JsonFileCollector;
use cea_aggregator::config::Config;
use cea_aggregator::domain::EventCandidate;
use cea_aggregator::heuristics::HeuristicCatalog;
use cea_aggregator::logging;
use cea_aggregator::pipeline::dedupe::{DedupeConfig, Deduplicator};
use cea_aggregator::pipeline::enrich::Enricher;
use cea_aggregator::pipeline::validator::Validator;
use cea_aggregator::pipeline::Orchestrator;
use cea_aggregator::storage::JsonEventStore;
use cea_aggregator::types::Collector;

#[derive(Parser)]
#[command(name = "cea_aggregator")]
#[command(about = "Cambridge area event catalog aggregator")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: collect, validate, deduplicate, persist
    Run {
        /// Specific sources to collect (comma-separated); defaults to every
        /// source not marked skip in the config
        #[arg(long)]
        sources: Option<String>,
        /// Path of the persisted event store
        #[arg(long, default_value = "data/events.json")]
        store: String,
    },
    /// Validate a harvested candidates file and print each verdict
    Check {
        /// Path to a JSON array of candidates
        file: String,
    },
}

fn build_validator(config: &Config) -> Result<Validator, Box<dyn std::error::Error>> {
    let catalog = match &config.heuristics_file {
        Some(path) => HeuristicCatalog::load(path)?,
        None => HeuristicCatalog::default(),
    };
    let enricher = Enricher::new(catalog)?;
    info!(catalog = enricher.catalog_version(), "heuristic catalog loaded");
    Ok(Validator::new(&config.metro, &config.pipeline, enricher)?)
}

async fn run_pipeline(
    config: &Config,
    sources: Option<String>,
    store_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let selected: Option<Vec<String>> = sources
        .map(|list| list.split(',').map(|s| s.trim().to_string()).collect());

    let mut collectors: Vec<Box<dyn Collector>> = Vec::new();
    let mut skipped: Vec<String> = Vec::new();

    for source in &config.sources {
        let wanted = match &selected {
            Some(names) => names.contains(&source.name),
            None => !source.skip,
        };
        if wanted {
            collectors.push(Box::new(JsonFileCollector::new(
                &source.name,
                &source.candidates_file,
            )));
        } else {
            skipped.push(source.name.clone());
        }
    }

    if collectors.is_empty() {
        warn!("no sources selected; only skipped-source records will be kept");
    }
    info!(
        running = collectors.len(),
        skipped = skipped.len(),
        "source roster resolved"
    );

    let validator = build_validator(config)?;
    let deduplicator = Deduplicator::with_config(DedupeConfig::from(&config.pipeline));
    let store = Arc::new(JsonEventStore::new(store_path));

    let mut orchestrator =
        Orchestrator::new(collectors, skipped, validator, deduplicator, store);
    let summary = orchestrator.run().await?;

    println!("\n📊 Aggregation run complete:");
    println!("   Collected:  {}", summary.collected);
    println!("   Rejected:   {}", summary.rejected);
    println!("   Unique:     {}", summary.unique);
    println!("   Preserved:  {}", summary.preserved);
    println!("   Persisted:  {} -> {}", summary.persisted, store_path);

    if !summary.collector_errors.is_empty() {
        println!("\n⚠️  Collector failures:");
        for failure in &summary.collector_errors {
            println!("   - {}", failure);
        }
    }

    Ok(())
}

fn check_candidates(config: &Config, file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file)?;
    let candidates: Vec<EventCandidate> = serde_json::from_str(&content)?;
    let validator = build_validator(config)?;

    let mut accepted = 0;
    let mut rejected = 0;

    for mut candidate in candidates {
        validator.clean_and_enhance(&mut candidate);
        match validator.validate(&candidate) {
            Ok(()) => {
                accepted += 1;
                println!("✅ {}", candidate.title);
            }
            Err(reason) => {
                rejected += 1;
                println!("❌ {} ({})", candidate.title, reason);
            }
        }
    }

    println!("\n{} accepted, {} rejected", accepted, rejected);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "config not loaded, using built-in defaults");
            Config::default()
        }
    };

    match cli.command {
        Commands::Run { sources, store } => {
            if let Err(e) = run_pipeline(&config, sources, &store).await {
                error!(error = %e, "aggregation run failed");
                return Err(e);
            }
        }
        Commands::Check { file } => {
            check_candidates(&config, &file)?;
        }
    }

    Ok(())
}
