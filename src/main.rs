//! LLMO-Audit main entry point
//!
//! This is the command-line interface for auditing a single page's
//! readiness for LLM crawlers.

use anyhow::{Context, Result};
use clap::Parser;
use llmo_audit::config::{load_config_with_hash, AuditConfig};
use llmo_audit::report::{generate_markdown_report, Report, Severity};
use llmo_audit::{AnalysisTarget, Analyzer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// LLMO-Audit: LLM-optimization readiness audits
///
/// Fetches one page, checks crawlability, structured data, content
/// structure and E-E-A-T signals, and prints a weighted 0-100 report.
#[derive(Parser, Debug)]
#[command(name = "llmo-audit")]
#[command(version = "1.0.0")]
#[command(about = "Audit a web page for LLM-optimization readiness", long_about = None)]
struct Cli {
    /// URL of the page to audit (http or https)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// Also write a markdown report to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and URL, print the effective settings, and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => AuditConfig::default(),
    };

    let target = AnalysisTarget::parse(&cli.url)
        .with_context(|| format!("Invalid URL: {}", cli.url))?;

    let analyzer = Analyzer::new(config).context("Invalid configuration")?;

    if cli.dry_run {
        print_dry_run(analyzer.config(), &target);
        return Ok(());
    }

    let report = analyzer.analyze(target).await;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print_summary(&report);
    }

    if let Some(path) = &cli.output {
        generate_markdown_report(&report, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!("Markdown report written to {}", path.display());
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
            0 => EnvFilter::new("llmo_audit=info,warn"),
            1 => EnvFilter::new("llmo_audit=debug,info"),
            2 => EnvFilter::new("llmo_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so --json output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the settings an audit would use
fn print_dry_run(config: &AuditConfig, target: &AnalysisTarget) {
    println!("=== LLMO-Audit Dry Run ===\n");

    println!("Target: {}", target);

    println!("\nWeights:");
    println!("  Crawlability: {}", config.weights.crawlability);
    println!("  Structured data: {}", config.weights.structured_data);
    println!("  Content structure: {}", config.weights.content_structure);
    println!("  E-E-A-T: {}", config.weights.eeat);

    println!("\nFetcher:");
    println!("  Max retries: {}", config.fetcher.max_retries);
    println!("  Fetch timeout: {}ms", config.fetcher.fetch_timeout_ms);
    println!("  Backoff base: {}ms", config.fetcher.backoff_base_ms);
    println!("  Concurrency limit: {}", config.fetcher.concurrency_limit);
    println!("  User agents: {}", config.fetcher.user_agents.len());

    println!("\nRun timeout: {}ms", config.run.run_timeout_ms);
    println!(
        "Max paragraph words: {}",
        config.content.max_paragraph_words
    );

    println!("\n✓ Configuration is valid");
}

/// Prints a plain-text summary of a report
fn print_summary(report: &Report) {
    println!("=== LLMO Audit: {} ===\n", report.url);
    println!("Overall score: {:.2} / 100\n", report.overall_score);

    for (category, result) in report.categories() {
        println!("{:<18} {:>6.2}", category.title(), result.score);
        for issue in &result.issues {
            let marker = match issue.severity {
                Severity::Pass => "✓",
                Severity::Warn => "!",
                Severity::Fail => "✗",
            };
            println!("    {} {}", marker, issue.text);
        }
    }

    if !report.recommendations.is_empty() {
        println!("\nRecommendations:");
        for (i, rec) in report.recommendations.iter().enumerate() {
            println!("  {}. {}", i + 1, rec);
        }
    }
}
