//! Shiori main entry point
//!
//! This is the command-line interface for inspecting and administering a
//! crawl task's shared state in Redis.

use clap::Parser;
use shiori::config::load_config;
use shiori::StateTracker;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shiori: a shared crawl-state tracker
///
/// Shiori keeps the mutable state of a distributed crawl in Redis: visit
/// counters with a sliding window, a per-host cookie jar, and a queue of
/// pending requests. This tool checks connectivity, reports queue depth,
/// and clears a namespace between crawl runs.
#[derive(Parser, Debug)]
#[command(name = "shiori")]
#[command(version = "1.0.0")]
#[command(about = "A shared crawl-state tracker", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Check store connectivity and exit
    #[arg(long, conflicts_with_all = ["stats", "clear"])]
    ping: bool,

    /// Show namespace statistics and exit (default mode)
    #[arg(long, conflicts_with_all = ["ping", "clear"])]
    stats: bool,

    /// Delete every key in this namespace and exit
    #[arg(long, conflicts_with_all = ["ping", "stats"])]
    clear: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Connecting already performs a liveness PING.
    let tracker = StateTracker::connect(&config).await?;

    if cli.ping {
        handle_ping(&config);
    } else if cli.clear {
        handle_clear(&tracker, &config).await?;
    } else {
        handle_stats(&tracker, &config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shiori=info,warn"),
            1 => EnvFilter::new("shiori=debug,info"),
            2 => EnvFilter::new("shiori=trace,debug"),
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

/// Handles the --ping mode: connectivity was already verified by connect
fn handle_ping(config: &shiori::Config) {
    println!("✓ Store at {} is reachable", config.store.address);
    println!("✓ Namespace: {}", config.store.namespace);
}

/// Handles the --stats mode: shows what this namespace currently holds
async fn handle_stats(
    tracker: &StateTracker<shiori::RedisStore>,
    config: &shiori::Config,
) -> anyhow::Result<()> {
    println!("=== Shiori Namespace Statistics ===\n");
    println!("Store: {}", config.store.address);
    println!("Namespace: {}", config.store.namespace);
    println!(
        "Visit window: {}s, visit limit: {}",
        config.tracker.visit_window_seconds, config.tracker.visit_limit
    );

    let pending = tracker.queue_size().await?;
    println!("\nPending requests: {}", pending);

    Ok(())
}

/// Handles the --clear mode: wipes the namespace
async fn handle_clear(
    tracker: &StateTracker<shiori::RedisStore>,
    config: &shiori::Config,
) -> anyhow::Result<()> {
    tracing::warn!("Clearing namespace '{}'", config.store.namespace);
    tracker.clear().await?;
    println!("✓ Namespace '{}' cleared", config.store.namespace);
    Ok(())
}
