// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things). The `env` feature lets an
// option fall back to an environment variable, which is how Redis is usually
// configured inside containers.
// =============================================================================

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "site-crawler",
    version,
    about = "Crawl every HTML page of a single website",
    long_about = "site-crawler starts from a seed URL and visits every in-domain HTML page reachable \
                  by links, each exactly once. With --distributed, the work queue and the seen-URL \
                  set live in Redis so several crawler processes can share one crawl."
)]
pub struct Cli {
    /// The website URL to start from (e.g., https://example.com)
    pub url: String,

    /// Use Redis for the work queue and the seen-URL set
    #[arg(short = 'd', long = "distributed", visible_alias = "dist")]
    pub distributed: bool,

    /// Number of pages fetched concurrently
    #[arg(short = 't', long, default_value_t = 30)]
    pub threads: usize,

    /// Redis connection URL for --distributed
    ///
    /// Defaults to redis://localhost:6379 when ENVIRONMENT=dev,
    /// otherwise redis://redis-web-crawler:6379
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// Redis stream holding queued URLs
    #[arg(long, default_value = "web-crawler-urls")]
    pub queue_key: String,

    /// Redis set holding every URL ever queued
    #[arg(long, default_value = "web-crawler-url-cache")]
    pub cache_key: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,

    /// Longest to wait for running fetches once the queue is exhausted
    #[arg(long, default_value_t = 60)]
    pub drain_timeout_secs: u64,

    /// Log a progress line every half second
    #[arg(long)]
    pub progress: bool,

    /// Output the report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// List every visited URL after the summary
    #[arg(long)]
    pub print_urls: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["site-crawler", "https://example.com"]).unwrap();
        assert_eq!(cli.url, "https://example.com");
        assert!(!cli.distributed);
        assert_eq!(cli.threads, 30);
        assert_eq!(cli.queue_key, "web-crawler-urls");
        assert_eq!(cli.timeout_secs, 5);
    }

    #[test]
    fn test_distributed_aliases() {
        let cli = Cli::try_parse_from(["site-crawler", "-d", "-t", "8", "https://x.com"]).unwrap();
        assert!(cli.distributed);
        assert_eq!(cli.threads, 8);

        let cli = Cli::try_parse_from(["site-crawler", "--dist", "https://x.com"]).unwrap();
        assert!(cli.distributed);
    }

    #[test]
    fn test_url_is_required() {
        assert!(Cli::try_parse_from(["site-crawler"]).is_err());
    }
}
