// src/main.rs
// =============================================================================
// This is the entry point of the crawler CLI.
//
// What happens here:
// 1. Parse command-line arguments and set up logging
// 2. Build the frontier and dedup set (local or Redis)
// 3. Run the crawl to completion
// 4. Print the report
// 5. Exit with a proper code (0 = success, 1 = some pages failed, 2 = error)
// =============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use site_crawler::cli::Cli;
use site_crawler::client::HttpWebClient;
use site_crawler::config::CrawlerConfig;
use site_crawler::Crawler;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every reachable page was crawled
//   Ok(1) = crawl finished but some pages failed
//   Err   = the crawl could not run (bad seed, Redis unreachable, ...)
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging();

    let config = CrawlerConfig::from_cli(&cli);
    info!(
        config = %serde_json::to_string(&config)?,
        "🚀 running web crawler"
    );

    let (frontier, dedup) = config
        .build_backends()
        .await
        .context("cannot reach crawl backend")?;
    let client = HttpWebClient::new(config.request_timeout()).context("cannot build HTTP client")?;

    let crawler = Crawler::new(
        &config.seed,
        frontier,
        dedup,
        Arc::new(client),
        config.crawl_options(),
    )
    .await
    .with_context(|| format!("cannot start crawl at '{}'", config.seed))?;

    let report = crawler.crawl().await?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.summary(cli.print_urls));
    }

    Ok(if report.has_failures() { 1 } else { 0 })
}

// Logs go to stderr so JSON on stdout stays machine-readable.
// RUST_LOG overrides the default level, e.g. RUST_LOG=site_crawler=debug
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
