//! Crane main entry point
//!
//! This is the command-line interface for the crane lesson scraper.

use clap::Parser;
use crane::config::{load_config_with_hash, Config, LoginMode};
use crane::crawler::crawl;
use crane::export::{write_records, ExportFormat};
use crane::page::BrowserPage;
use crane::session::{AssistedLogin, CredentialLogin, LoginStrategy, OperatorSignal};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Crane: an authenticated lesson scraper
///
/// Crane logs into a lesson console, walks every lesson page behind the
/// session, extracts phrase-level records, and exports them as tabular data.
#[derive(Parser, Debug)]
#[command(name = "crane")]
#[command(version = "1.0.0")]
#[command(about = "An authenticated lesson scraper", long_about = None)]
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

    /// Validate config and show what would be crawled without launching a browser
    #[arg(long)]
    dry_run: bool,

    /// Override the configured export format (csv, tsv, json, xml, sheet)
    #[arg(long, value_name = "FORMAT")]
    format: Option<ExportFormat>,

    /// Override the configured export path
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Suspend at the login boundary and wait for a manual login,
    /// overriding the configured login mode
    #[arg(long)]
    assisted_login: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.assisted_login {
        config.login.mode = LoginMode::Assisted;
    }

    let format = cli.format.unwrap_or(config.output.format);
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.path));

    if cli.dry_run {
        handle_dry_run(&config, &hash, format, &output_path);
        return Ok(());
    }

    handle_crawl(config, format, &output_path).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crane=info,warn"),
            1 => EnvFilter::new("crane=debug,info"),
            2 => EnvFilter::new("crane=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config, hash: &str, format: ExportFormat, output: &std::path::Path) {
    println!("=== Crane Dry Run ===\n");

    println!("Site:");
    println!("  Root URL: {}", config.site.root_url);
    println!("  Login path: {}", config.site.login_path);
    println!("  Success marker: {}", config.site.success_marker);

    println!("\nCrawler:");
    println!("  Workers: {}", config.crawler.max_concurrent_pages);
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Retry backoff: {}ms", config.crawler.retry_backoff_ms);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!("  Slide numbering: {:?}", config.crawler.slide_numbering);

    println!("\nLogin:");
    println!("  Mode: {:?}", config.login.mode);
    println!("  Timeout: {}s", config.login.login_timeout_secs);

    println!("\nOutput:");
    println!("  Path: {}", output.display());
    println!("  Format: {:?}", format);
    println!("  Strip delimiters: {}", config.output.strip_delimiters);

    println!("\n✓ Configuration is valid (hash: {})", hash);
}

/// Handles the main crawl operation: browser, crawl, export
async fn handle_crawl(
    config: Config,
    format: ExportFormat,
    output_path: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    // Assisted login needs a window the operator can see
    let headless = config.login.mode != LoginMode::Assisted;
    let page = Arc::new(BrowserPage::launch(headless).await?);

    let strategy: Box<dyn LoginStrategy> = match config.login.mode {
        LoginMode::Credentials => Box::new(CredentialLogin::new(config.login.clone())),
        LoginMode::Assisted => {
            let signal = OperatorSignal::new();
            spawn_operator_prompt(signal.clone());
            Box::new(AssistedLogin::new(signal))
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            let _ = shutdown_tx.send(true);
        }
    });

    let outcome = match crawl(config, page, strategy, shutdown_rx).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl aborted before any export: {}", e);
            return Err(e.into());
        }
    };

    // Partial results from an interrupted run are still worth keeping
    if outcome.interrupted {
        tracing::warn!(
            "Run was interrupted; exporting the {} records extracted so far",
            outcome.records.len()
        );
    }

    for failure in &outcome.permanent_failures {
        tracing::warn!(
            "Unrecoverable: {} ({} attempts): {}",
            failure.url,
            failure.attempts,
            failure.error
        );
    }

    write_records(&outcome.records, format, output_path)?;

    tracing::info!(
        "Done: {} pages, {} records, {} row errors, {} unrecoverable pages",
        outcome.pages_processed,
        outcome.records.len(),
        outcome.row_errors,
        outcome.permanent_failures.len()
    );

    Ok(())
}

/// Reads one line from stdin and resumes a suspended assisted login
fn spawn_operator_prompt(signal: OperatorSignal) {
    tokio::task::spawn_blocking(move || {
        println!("Finish logging in inside the browser window, then press ENTER here.");
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_ok() {
            signal.acknowledge();
        }
    });
}
