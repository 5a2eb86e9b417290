// src/lib.rs
// =============================================================================
// site-crawler: visit every HTML page of one website exactly once.
//
// Modules:
// - links:    URL canonicalization and crawl scope
// - frontier: queue of URLs waiting to be fetched (local or Redis)
// - dedup:    set of URLs ever queued (local or Redis)
// - client:   HTTP probe/fetch and link extraction
// - crawl:    the orchestrator that ties them together
// - config / cli: turning flags into ready-made backends
// =============================================================================

pub mod cli;
pub mod client;
pub mod config;
pub mod crawl;
pub mod dedup;
pub mod error;
pub mod frontier;
pub mod links;

pub use crawl::{CrawlOptions, CrawlReport, CrawlState, Crawler};
pub use error::{CrawlError, ParseError};
