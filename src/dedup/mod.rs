// src/dedup/mod.rs
// =============================================================================
// The dedup set remembers every URL ever admitted to the frontier.
//
// Unlike the frontier it is never drained: once a URL is in, it stays in for
// the whole crawl. `add` doubles as the admission check. It returns true only
// for the one caller that actually inserted the URL, so two workers that find
// the same link at the same moment cannot both enqueue it.
//
// Backends:
// - local: a concurrent in-process set
// - redis: a Redis set, shared by every crawler process using the same key
// =============================================================================

mod local;
mod redis_set;

pub use self::local::LocalDedupSet;
pub use self::redis_set::RedisDedupSet;

use crate::error::CrawlError;
use async_trait::async_trait;

#[async_trait]
pub trait DedupSet: Send + Sync {
    async fn contains(&self, url: &str) -> Result<bool, CrawlError>;

    /// Inserts `url`, returning true iff it was not present before.
    ///
    /// Must be a single atomic insert-if-absent, never contains-then-insert.
    async fn add(&self, url: &str) -> Result<bool, CrawlError>;

    async fn size(&self) -> Result<usize, CrawlError>;

    fn kind(&self) -> &'static str;
}
