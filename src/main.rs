//! Quote-Harvester main entry point
//!
//! This is the command-line interface for the Quote-Harvester crawler.

use clap::Parser;
use quote_harvester::config::{load_config_with_hash, validate, Config};
use quote_harvester::crawler::Coordinator;
use quote_harvester::output::{print_statistics, JsonFileSink};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Quote-Harvester: a concurrent quote and author crawler
///
/// Quote-Harvester walks every listing page of a quotes site, enriches each
/// author with biography details and writes the collected data as JSON.
#[derive(Parser, Debug)]
#[command(name = "quote-harvester")]
#[command(version)]
#[command(about = "A concurrent quote and author crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write the result to this file instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(cli.config.as_ref())?;
    if let Some(path) = &cli.output {
        config.output.result_path = path.display().to_string();
        validate(&config)?;
    }

    let sink = JsonFileSink::new(&config.output.result_path);
    let mut coordinator = Coordinator::new(config);

    // Ctrl-C stops outstanding fetches; the run then fails with `Cancelled`
    let cancel = coordinator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            cancel.cancel();
        }
    });

    match coordinator.run_and_store(&sink).await {
        Ok(_) => {
            tracing::info!("Crawl completed successfully");
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    }

    if !cli.quiet {
        if let Some(stats) = coordinator.statistics() {
            println!();
            print_statistics(stats);
        }
    }

    Ok(())
}

/// Loads the configuration file, or the defaults when no path is given
fn load(path: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("quote_harvester=info,warn"),
            1 => EnvFilter::new("quote_harvester=debug,info"),
            2 => EnvFilter::new("quote_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
