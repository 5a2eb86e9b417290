// src/config.rs
// =============================================================================
// Resolved crawler configuration.
//
// The CLI gives us raw flags; this module turns them into one CrawlerConfig:
// - which backend holds the frontier and dedup set (local or Redis)
// - where Redis lives when it is used
// - worker pool size and timeouts
//
// It also builds the backends, so the orchestrator only ever receives
// ready-made `Arc<dyn Frontier>` / `Arc<dyn DedupSet>` values.
// =============================================================================

use crate::cli::Cli;
use crate::crawl::CrawlOptions;
use crate::dedup::{DedupSet, LocalDedupSet, RedisDedupSet};
use crate::error::CrawlError;
use crate::frontier::{Frontier, LocalFrontier, RedisFrontier};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const DEV_REDIS_URL: &str = "redis://localhost:6379";
const PROD_REDIS_URL: &str = "redis://redis-web-crawler:6379";

// How long one distributed dequeue may block waiting for an entry
const REDIS_POLL: Duration = Duration::from_millis(500);
const PROGRESS_EVERY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// In-process queue and set; one crawler process
    Local,
    /// Redis stream + Redis set, shareable between processes
    Redis {
        url: String,
        queue_key: String,
        cache_key: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlerConfig {
    pub seed: String,
    pub backend: Backend,
    pub threads: usize,
    pub timeout_secs: u64,
    pub drain_timeout_secs: u64,
    pub progress: bool,
}

impl CrawlerConfig {
    /// Resolves CLI flags, reading `ENVIRONMENT` for the default Redis URL.
    pub fn from_cli(cli: &Cli) -> Self {
        let environment = std::env::var("ENVIRONMENT").ok();
        Self::resolve(cli, environment.as_deref())
    }

    fn resolve(cli: &Cli, environment: Option<&str>) -> Self {
        let backend = if cli.distributed {
            Backend::Redis {
                url: cli
                    .redis_url
                    .clone()
                    .unwrap_or_else(|| default_redis_url(environment).to_string()),
                queue_key: cli.queue_key.clone(),
                cache_key: cli.cache_key.clone(),
            }
        } else {
            Backend::Local
        };

        Self {
            seed: cli.url.trim().to_string(),
            backend,
            threads: cli.threads.max(1),
            timeout_secs: cli.timeout_secs.max(1),
            drain_timeout_secs: cli.drain_timeout_secs,
            progress: cli.progress,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn crawl_options(&self) -> CrawlOptions {
        CrawlOptions {
            workers: self.threads,
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
            progress_interval: self.progress.then_some(PROGRESS_EVERY),
            ..CrawlOptions::default()
        }
    }

    /// Connects the configured frontier and dedup set.
    ///
    /// An unreachable Redis is `BackendUnavailable`.
    pub async fn build_backends(
        &self,
    ) -> Result<(Arc<dyn Frontier>, Arc<dyn DedupSet>), CrawlError> {
        let backends: (Arc<dyn Frontier>, Arc<dyn DedupSet>) = match &self.backend {
            Backend::Local => (
                Arc::new(LocalFrontier::new()),
                Arc::new(LocalDedupSet::new()),
            ),
            Backend::Redis {
                url,
                queue_key,
                cache_key,
            } => (
                Arc::new(RedisFrontier::connect(url, queue_key, REDIS_POLL).await?),
                Arc::new(RedisDedupSet::connect(url, cache_key).await?),
            ),
        };
        Ok(backends)
    }
}

fn default_redis_url(environment: Option<&str>) -> &'static str {
    match environment {
        Some("dev") => DEV_REDIS_URL,
        _ => PROD_REDIS_URL,
    }
}
