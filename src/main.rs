//! Paper-Harvest main entry point
//!
//! This is the command-line interface for the Paper-Harvest proceedings harvester.

use clap::Parser;
use paper_harvest::config::{load_config_with_hash, validate, Config};
use paper_harvest::crawler::crawl;
use paper_harvest::output::{export_summary, load_statistics, print_statistics};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Paper-Harvest: a resilient proceedings harvester
///
/// Paper-Harvest walks a conference archive (root index, one index per year,
/// one page per paper), downloads every paper's PDF into a per-year directory
/// and appends one metadata row per paper to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "paper-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resilient proceedings harvester", long_about = None)]
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

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics of the metadata file and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate markdown summary of the metadata file and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        return handle_crawl(config).await;
    }

    Ok(ExitCode::SUCCESS)
}

/// Loads the configuration file, or validated defaults when none is given
fn load(path: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            let config = Config::default();
            validate(&config)?;
            Ok(config)
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
            0 => EnvFilter::new("paper_harvest=info,warn"),
            1 => EnvFilter::new("paper_harvest=debug,info"),
            2 => EnvFilter::new("paper_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Paper-Harvest Dry Run ===\n");

    println!("Source:");
    println!("  Root URL: {}", config.source.base_url);
    println!("  Period link selector: {}", config.source.period_link_selector);
    println!(
        "  Document link pattern: {}",
        config.source.document_link_pattern
    );
    println!("  Title selector: {}", config.source.title_selector);
    println!("  Authors marker: {}", config.source.authors_marker);
    println!("  Attachment marker: {}", config.source.attachment_marker);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\nCrawler Configuration:");
    println!("  Max attempts: {}", config.crawler.max_attempts);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!(
        "  Max concurrent periods: {}",
        config.crawler.max_concurrent_periods
    );

    println!("\nOutput:");
    println!("  Metadata: {}", config.output.metadata_path.display());
    println!("  Attachments: {}", config.output.attachments_dir.display());
    println!("  Summary: {}", config.output.summary_path.display());

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling from {}", config.source.base_url);
}

/// Handles the --stats mode: shows statistics of the metadata file
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Metadata: {}\n", config.output.metadata_path.display());

    let stats = load_statistics(&config.output.metadata_path)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Exporting Harvest Summary ===\n");
    println!("Metadata: {}", config.output.metadata_path.display());
    println!("Output: {}", config.output.summary_path.display());
    println!();

    tracing::info!("Generating markdown summary...");
    export_summary(config)?;

    println!(
        "✓ Summary exported to: {}",
        config.output.summary_path.display()
    );

    Ok(())
}

/// Handles the main crawl operation
///
/// Exits non-zero when the root page could not be fetched.
async fn handle_crawl(config: Config) -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing::info!(
        "Root: {}, max concurrent periods: {}, max attempts: {}",
        config.source.base_url,
        config.crawler.max_concurrent_periods,
        config.crawler.max_attempts
    );

    match crawl(config).await {
        Ok(report) if report.root_given_up => {
            tracing::error!("Crawl produced nothing: root page unavailable");
            Ok(ExitCode::FAILURE)
        }
        Ok(report) => {
            tracing::info!(
                records = report.records_written,
                "Crawl completed successfully"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
