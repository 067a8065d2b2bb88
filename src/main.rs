//! HazardWatch - wildlife hazard analytics for airport operations
//!
//! Collects wildlife sightings, hazard reports and tasks over rolling
//! lookback windows, reduces them to per-period statistics and produces
//! an AI-written analysis, falling back to a templated summary whenever
//! the completion service cannot help.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, store unreachable, write failure, etc.)

mod analysis;
mod cli;
mod config;
mod llm;
mod models;
mod report;
mod server;
mod store;

use analysis::NarrativeProducer;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use llm::{ChatCompletionClient, CompletionClient};
use std::sync::Arc;
use std::time::Duration;
use store::{MemoryStore, RecordStore, RestStore};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("HazardWatch v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .hazardwatch.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", config::CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to set the store URL, model and thresholds.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Wire up the store and completion client, then serve or run once.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let store = build_store(&args, &config)?;

    let client = ChatCompletionClient::from_config(&config.model)
        .context("Failed to create completion client")?
        .map(|c| Arc::new(c) as Arc<dyn CompletionClient>);
    if client.is_none() {
        warn!("No completion API key configured; analyses will use the templated summary");
    }

    let producer = NarrativeProducer::new(client, &config.model, &config.analysis);

    if args.serve {
        let state = Arc::new(server::AppState { store, producer });
        return server::serve(state, &config.server.bind).await;
    }

    run_once(&args, store.as_ref(), &producer).await
}

/// Build the record store from --data or the configured hosted store.
fn build_store(args: &Args, config: &Config) -> Result<Arc<dyn RecordStore>> {
    if let Some(ref data) = args.data {
        info!("Using data snapshot: {}", data.display());
        return Ok(Arc::new(MemoryStore::from_json_file(data)?));
    }

    if config.store.url.is_empty() {
        bail!("No record store configured. Set --store-url (or HAZARDWATCH_STORE_URL) or use --data");
    }

    info!("Using hosted store: {}", config.store.url);
    let store = RestStore::new(&config.store).context("Failed to create store client")?;
    Ok(Arc::new(store))
}

/// Run a single analysis and write the report.
async fn run_once(args: &Args, store: &dyn RecordStore, producer: &NarrativeProducer) -> Result<()> {
    let spinner = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };
    spinner.set_message("Analyzing wildlife activity...");

    let result = analysis::run_analysis(store, producer, Utc::now()).await;
    spinner.finish_and_clear();
    let analysis = result?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&analysis)?,
        OutputFormat::Markdown => report::generate_markdown_report(&analysis, producer.model_name()),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                eprintln!("✅ Report saved to: {}", path.display());
            }
        }
        None => print!("{}", output),
    }

    let failures = analysis.fetch_failures();
    if !failures.is_empty() {
        warn!("{} store queries failed and were counted as empty", failures.len());
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
