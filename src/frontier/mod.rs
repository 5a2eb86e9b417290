// src/frontier/mod.rs
// =============================================================================
// The frontier is the queue of URLs that were discovered but not fetched yet.
//
// Two backends implement the same trait:
// - local: an in-process lock-free FIFO (single crawler process)
// - redis: a Redis Stream shared by every crawler process pointing at it
//
// The orchestrator only ever sees `Arc<dyn Frontier>`, so which backend is
// used is decided once at startup and injected.
//
// Rust concepts:
// - Traits: a shared interface with several implementations
// - async-trait: lets a trait with async methods be used as `dyn Trait`
// =============================================================================

mod local;
mod redis_stream;

pub use self::local::LocalFrontier;
pub use self::redis_stream::RedisFrontier;

use crate::error::CrawlError;
use async_trait::async_trait;
use std::fmt;

/// How many URLs are waiting, as far as the backend can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueSize {
    /// Counted directly; always correct
    Exact(usize),
    /// Read from shared backend state that may change right after
    Approximate(usize),
    /// The backend cannot count its pending entries
    Unknown,
}

impl QueueSize {
    /// The number, if there is one. `Unknown` is never reported as zero.
    pub fn count(&self) -> Option<usize> {
        match self {
            QueueSize::Exact(n) | QueueSize::Approximate(n) => Some(*n),
            QueueSize::Unknown => None,
        }
    }
}

impl fmt::Display for QueueSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueSize::Exact(n) => write!(f, "{}", n),
            QueueSize::Approximate(n) => write!(f, "~{}", n),
            QueueSize::Unknown => write!(f, "?"),
        }
    }
}

/// A work queue of canonical URLs awaiting fetch.
///
/// All methods are safe to call from many tasks at once.
#[async_trait]
pub trait Frontier: Send + Sync {
    /// Appends a URL. Callers only enqueue URLs that won dedup admission.
    async fn enqueue(&self, url: String) -> Result<(), CrawlError>;

    /// Takes the next URL, or `None` if nothing is available right now.
    ///
    /// Never blocks for longer than the backend's poll interval.
    async fn dequeue(&self) -> Result<Option<String>, CrawlError>;

    /// True when no URL is waiting. Backends that cannot be sure report false.
    async fn is_empty(&self) -> Result<bool, CrawlError>;

    async fn size(&self) -> Result<QueueSize, CrawlError>;

    /// Short backend name for log lines.
    fn kind(&self) -> &'static str;
}
