mod scrape;

use std::path::PathBuf;
use std::process::ExitCode;

use bbts_core::{AppConfig, Backend};
use bbts_scraper::StopReason;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::scrape::{run_scrape, RunReport};

#[derive(Debug, Parser)]
#[command(name = "bbts-cli")]
#[command(about = "Scrape storefront search results into an append-only CSV")]
struct Cli {
    /// Search text sent to the storefront, e.g. "marvel legends"
    search_term: String,

    /// Results requested per page (overrides PAGE_SIZE)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page_size: Option<u32>,

    /// Maximum number of pages to fetch (overrides PAGE_LIMIT)
    #[arg(long)]
    page_limit: Option<u32>,

    /// Log per-page progress (same as DEBUG=1)
    #[arg(long)]
    debug: bool,

    /// Page fetcher: http or browser (overrides BBTS_BACKEND)
    #[arg(long)]
    backend: Option<Backend>,

    /// CSV store to merge into (overrides BBTS_OUTPUT_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Exit code for a run that wrote no new rows
    #[arg(long, default_value_t = 0)]
    unchanged_exit_code: u8,
}

impl Cli {
    /// Applies command-line overrides on top of the environment config.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(page_limit) = self.page_limit {
            config.page_limit = page_limit;
        }
        if self.debug {
            config.debug = true;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(output) = &self.output {
            config.output_path.clone_from(output);
        }
    }
}

/// `RUST_LOG` wins, then `BBTS_LOG_LEVEL`. Debug mode raises this
/// workspace's crates to `debug` without flooding the output with
/// HTTP-client internals.
fn log_filter(config: &AppConfig) -> anyhow::Result<EnvFilter> {
    if config.debug {
        return Ok(EnvFilter::try_new(format!(
            "{},bbts_cli=debug,bbts_scraper=debug,bbts_store=debug",
            config.log_level
        ))?);
    }
    Ok(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?)
}

fn print_summary(report: &RunReport, config: &AppConfig) {
    println!("pages processed: {}", report.pages_fetched);
    println!("records found: {}", report.records_found);
    println!("items skipped: {}", report.skipped_items);
    println!("new rows written: {}", report.merge.written);
    println!("duplicates skipped: {}", report.merge.skipped_duplicate);
    if let StopReason::FetchFailed { page, error } = &report.stop {
        println!("stopped early: page {page} failed: {error}");
    }
    println!("status={}", report.status());
    println!(
        "Scraping completed and results saved to {}.",
        config.output_path.display()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = bbts_core::load_app_config()?;
    cli.apply(&mut config);

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config)?)
        .init();

    let report = run_scrape(&config, &cli.search_term).await?;
    print_summary(&report, &config);

    if report.failed_before_first_page() {
        tracing::error!("no page could be fetched");
    }
    Ok(ExitCode::from(report.exit_code(cli.unchanged_exit_code)))
}
